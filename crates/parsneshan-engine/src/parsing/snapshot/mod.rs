//! # Snapshot Testing Support
//!
//! Helpers for asserting on token streams in tests.
//!
//! - **`outline`**: renders a stream as an indented, line-per-token text
//!   outline for `insta` snapshots
//! - **`invariants`**: panics when a stream is not a well-formed forest or
//!   when token levels disagree with nesting depth

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::outline;
