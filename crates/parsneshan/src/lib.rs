//! # parsneshan
//!
//! Persian-oriented Markdown extensions on top of [`parsneshan_engine`].
//!
//! [`ParsNeshan`] is an engine with every extension registered:
//!
//! | Plugin | Stage | Syntax |
//! |--------|-------|--------|
//! | [`Highlight`] | inline, before `emphasis` | `==text==` → `<mark>` |
//! | [`Admonition`] | block, before `fence` | `...توجه` … `...` callouts |
//! | [`Poetry`] | block, before `fence` | `...شعر` … `...` stanzas of verses |
//! | [`Checklist`] | core, after `inline` | `- [ ]` / `- [x]` task items |
//! | [`PersianList`] | core, before `block` | `۱. ` ordered-list markers |
//! | [`AutoDirection`] | render step | `dir="rtl"` / `dir="ltr"` on blocks |
//!
//! Each plugin can also be applied to a bare [`Engine`] on its own.
//!
//! ```
//! use parsneshan::{Options, ParsNeshan};
//!
//! let md = ParsNeshan::new(Options::default()).unwrap();
//! assert_eq!(md.render("## سلام دنیا!"), "<h2 dir=\"rtl\">سلام دنیا!</h2>\n");
//! ```

pub mod admonition;
pub mod checklist;
pub mod digits;
pub mod direction;
pub mod error;
pub mod highlight;
pub mod options;
pub mod parser;
pub mod plugin;
pub mod poetry;

pub use admonition::{Admonition, AdmonitionKind, AdmonitionTable};
pub use checklist::Checklist;
pub use digits::PersianList;
pub use direction::cache::{BoundedCache, DirectionCache, NoCache};
pub use direction::{AutoDirection, Direction, DirectionAnnotator};
pub use error::{AdmonitionTableError, Error, PluginError};
pub use highlight::Highlight;
pub use options::{CachePolicy, Options};
pub use parser::ParsNeshan;
pub use parsneshan_engine::{Engine, EngineOptions};
pub use plugin::{Plugin, PluginSpec};
