pub mod autolink;
pub mod code_span;
pub mod emphasis;
pub mod link;
pub mod text;
