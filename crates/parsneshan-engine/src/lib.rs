//! # parsneshan-engine
//!
//! A token-stream Markdown engine built around ordered, named rule lists.
//!
//! ## Pipeline
//!
//! 1. **Core** rules run once per document over [`CoreState`]: `normalize`,
//!    `block`, `inline`, plus anything plugins insert around them
//! 2. **Block** rules scan whole lines through [`BlockState`] and append
//!    tokens to a flat stream
//! 3. **Inline** rules scan the content of every `inline` token through
//!    [`InlineState`] and fill its `children`
//! 4. The [`Renderer`] serializes the stream to HTML, running registered
//!    [`RenderStep`]s before each token's render rule
//!
//! ## Key Invariants
//!
//! - Every rule either consumes its whole construct or reports no match
//! - The token stream is a well-formed forest: nesting deltas never go
//!   negative and sum to zero (see [`token::check_nesting`])
//! - Rule order is priority; plugins insert relative to named anchors

pub mod engine;
pub mod error;
pub mod parsing;
pub mod render;
pub mod ruler;
pub mod token;

pub use engine::{Engine, EngineOptions};
pub use error::EngineError;
pub use parsing::blocks::{BlockContext, BlockParser, BlockRule, BlockState, LineMarks};
pub use parsing::core::{CoreParser, CoreRule, CoreState};
pub use parsing::inline::{Delimiter, InlineParser, InlinePostRule, InlineRule, InlineState};
pub use render::{RenderRule, RenderStep, Renderer};
pub use ruler::Ruler;
pub use token::{Nesting, Token};
