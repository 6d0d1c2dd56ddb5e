pub mod blocks;
pub mod core;
pub(crate) mod html;
pub mod inline;
pub mod snapshot;
