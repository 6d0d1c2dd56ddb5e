//! Persian-digit ordered lists: `۱. ` markers are rewritten to `1. ` before
//! block parsing, so the host list rule recognizes them.
//!
//! The rewrite works on raw text, ahead of any block structure, so markers
//! inside fenced code are rewritten as well.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use parsneshan_engine::{CoreRule, CoreState, Engine};
use regex::{Captures, Regex};

use crate::error::PluginError;
use crate::plugin::{Plugin, no_options};

fn marker_re() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?m)^([ \t]*)([۰-۹]+)\. ").expect("Invalid Persian list marker regex"))
}

/// Maps `۰`..`۹` to `0`..`9`; other characters pass through.
pub fn to_ascii_digit(ch: char) -> char {
    match ch {
        '۰'..='۹' => char::from(b'0' + (ch as u32 - '۰' as u32) as u8),
        _ => ch,
    }
}

/// Rewrites the digits of every line-initial `<persian digits>. ` marker.
pub fn normalize_list_markers(src: &str) -> Cow<'_, str> {
    marker_re().replace_all(src, |caps: &Captures<'_>| {
        let digits: String = caps[2].chars().map(to_ascii_digit).collect();
        format!("{}{digits}. ", &caps[1])
    })
}

/// Core rule `persian_ordered_list`, before `block`.
pub fn persian_ordered_list(state: &mut CoreState<'_>) {
    if let Cow::Owned(rewritten) = normalize_list_markers(&state.src) {
        state.src = rewritten;
    }
}

pub struct PersianList;

impl PersianList {
    pub const RULE: &'static str = "persian_ordered_list";
}

impl Plugin for PersianList {
    fn name(&self) -> &str {
        Self::RULE
    }

    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError> {
        no_options(self.name(), options)?;
        let rule: Arc<dyn CoreRule> = Arc::new(persian_ordered_list);
        md.core
            .ruler
            .before("block", Self::RULE, rule)
            .map_err(PluginError::registration(Self::RULE))
    }
}
