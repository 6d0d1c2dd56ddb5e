//! Verse blocks:
//!
//! ```text
//! ...شعر
//! بشنو از نی چون حکایت می‌کند
//! از جدایی‌ها شکایت می‌کند
//!
//! کز نیستان تا مرا ببریده‌اند
//! در نفیرم مرد و زن نالیده‌اند
//! ...
//! ```
//!
//! Blank lines separate stanzas. Each verse is inline-parsed only.

use std::sync::Arc;

use parsneshan_engine::{BlockRule, BlockState, Engine, Nesting};

use crate::admonition::SENTINEL;
use crate::error::PluginError;
use crate::plugin::{Plugin, no_options};

pub const START: &str = "...شعر";

/// Splits the trimmed lines `[first, end)` into stanzas of verse line
/// numbers. Runs of blank lines produce no empty stanzas.
fn stanzas(state: &BlockState<'_>, first: usize, end: usize) -> Vec<Vec<usize>> {
    let mut stanzas = Vec::new();
    let mut current = Vec::new();
    for line in first..end {
        if state.line_text(line).trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        stanzas.push(current);
    }
    stanzas
}

/// Block rule `poetry`. The opening line must be exactly `...شعر` after
/// trimming; the block ends at the first line that trims to `...`.
pub fn poetry(state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.line_text(start_line).trim() != START {
        return false;
    }
    let Some(end) = (start_line + 1..end_line).find(|&line| state.line_text(line).trim() == SENTINEL) else {
        return false;
    };
    if silent {
        return true;
    }

    let open = state.push("poetry_open", "div", Nesting::Open);
    open.attr_set("class", "poetry-container");
    open.markup = START.to_string();
    open.map = Some((start_line, end + 1));

    for stanza in stanzas(state, start_line + 1, end) {
        let first = stanza[0];
        let last = stanza[stanza.len() - 1];
        let open = state.push("stanza_open", "div", Nesting::Open);
        open.attr_set("class", "poetry-stanza");
        open.map = Some((first, last + 1));

        for line in stanza {
            let text = state.line_text(line).trim().to_string();
            state
                .push("verse_open", "p", Nesting::Open)
                .attr_set("class", "poetry-verse");
            let verse = state.push("inline", "", Nesting::SelfClosing);
            verse.content = text;
            verse.map = Some((line, line + 1));
            state.push("verse_close", "p", Nesting::Close);
        }

        state.push("stanza_close", "div", Nesting::Close);
    }

    state.push("poetry_close", "div", Nesting::Close).markup = SENTINEL.to_string();
    state.line = end + 1;
    true
}

pub struct Poetry;

impl Poetry {
    pub const RULE: &'static str = "poetry";
}

impl Plugin for Poetry {
    fn name(&self) -> &str {
        Self::RULE
    }

    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError> {
        no_options(self.name(), options)?;
        let rule: Arc<dyn BlockRule> = Arc::new(poetry);
        md.block
            .ruler
            .before("fence", Self::RULE, rule)
            .map_err(PluginError::registration(Self::RULE))
    }
}
