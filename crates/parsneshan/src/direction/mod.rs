//! Block text direction.
//!
//! A [`RenderStep`] that sets `dir="rtl"` or `dir="ltr"` on paragraphs,
//! headings, list items, blockquotes and tables from the first letter of
//! their text. Arabic-script letters win `rtl`, ASCII letters win `ltr`,
//! and text with neither defaults to `rtl`.

pub mod cache;

use std::fmt;
use std::sync::Arc;

use parsneshan_engine::{Engine, RenderStep, Token};

use self::cache::{DirectionCache, KEY_CHARS};
use crate::error::PluginError;
use crate::plugin::{Plugin, no_options};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Rtl,
    Ltr,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Rtl => "rtl",
            Direction::Ltr => "ltr",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first deciding letter's direction and its char index.
fn decide(text: &str) -> Option<(Direction, usize)> {
    text.chars().enumerate().find_map(|(idx, ch)| match ch {
        '\u{0600}'..='\u{06FF}' => Some((Direction::Rtl, idx)),
        ch if ch.is_ascii_alphabetic() => Some((Direction::Ltr, idx)),
        _ => None,
    })
}

pub fn classify(text: &str) -> Direction {
    decide(text).map_or(Direction::Rtl, |(direction, _)| direction)
}

const ANNOTATED: [&str; 5] = [
    "paragraph_open",
    "heading_open",
    "list_item_open",
    "blockquote_open",
    "table_open",
];

/// Render step `auto_direction`.
pub struct DirectionAnnotator {
    cache: Arc<dyn DirectionCache>,
}

impl DirectionAnnotator {
    pub const STEP: &'static str = "auto_direction";

    pub fn new(cache: Arc<dyn DirectionCache>) -> Self {
        Self { cache }
    }

    /// Classifies through the cache. A result is stored only when the key
    /// prefix alone determines it.
    pub fn detect(&self, text: &str) -> Direction {
        let key: String = text.chars().take(KEY_CHARS).collect();
        if let Some(direction) = self.cache.get(&key) {
            return direction;
        }
        match decide(text) {
            Some((direction, idx)) => {
                if idx < KEY_CHARS {
                    self.cache.insert(key, direction);
                }
                direction
            }
            None => {
                if text.chars().nth(KEY_CHARS - 1).is_none() {
                    self.cache.insert(key, Direction::Rtl);
                }
                Direction::Rtl
            }
        }
    }

    /// Text that decides the direction of the block opened at `idx`.
    pub fn representative_text(tokens: &[Token], idx: usize) -> Option<&str> {
        if tokens[idx].is("table_open") {
            return tokens[idx + 1..]
                .iter()
                .take_while(|token| !token.is("table_close"))
                .find(|token| token.is("inline"))
                .map(|token| token.content.as_str());
        }
        [idx + 1, idx + 2]
            .into_iter()
            .filter_map(|next| tokens.get(next))
            .find(|token| token.is("inline"))
            .map(|token| token.content.as_str())
    }
}

impl RenderStep for DirectionAnnotator {
    fn name(&self) -> &str {
        Self::STEP
    }

    fn applies_to(&self, kind: &str) -> bool {
        ANNOTATED.contains(&kind)
    }

    fn annotate(&self, tokens: &[Token], idx: usize) -> Vec<(String, String)> {
        match Self::representative_text(tokens, idx) {
            Some(text) if !text.is_empty() => {
                vec![("dir".to_string(), self.detect(text).as_str().to_string())]
            }
            _ => Vec::new(),
        }
    }
}

/// Installs [`DirectionAnnotator`] as a render step.
pub struct AutoDirection {
    cache: Arc<dyn DirectionCache>,
}

impl AutoDirection {
    pub fn new(cache: Arc<dyn DirectionCache>) -> Self {
        Self { cache }
    }
}

impl Default for AutoDirection {
    fn default() -> Self {
        Self::new(cache::shared())
    }
}

impl Plugin for AutoDirection {
    fn name(&self) -> &str {
        DirectionAnnotator::STEP
    }

    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError> {
        no_options(self.name(), options)?;
        md.renderer
            .push_step(Arc::new(DirectionAnnotator::new(Arc::clone(&self.cache))));
        Ok(())
    }
}
