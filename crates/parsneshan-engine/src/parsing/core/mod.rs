//! # Core Stage
//!
//! Whole-document rules run once per parse, in [`crate::Ruler`] order.
//! The defaults are `normalize`, `block` and `inline`; plugins rewrite the
//! source before `block` or walk the finished stream after `inline`.

use std::sync::Arc;

use crate::engine::Engine;
use crate::ruler::Ruler;
use crate::token::Token;

/// Mutable state shared by the core rules of one parse.
pub struct CoreState<'a> {
    pub src: String,
    pub tokens: Vec<Token>,
    pub md: &'a Engine,
}

impl<'a> CoreState<'a> {
    pub fn new(src: &str, md: &'a Engine) -> Self {
        Self {
            src: src.to_string(),
            tokens: Vec::new(),
            md,
        }
    }
}

pub trait CoreRule: Send + Sync {
    fn run(&self, state: &mut CoreState<'_>);
}

impl<F> CoreRule for F
where
    F: Fn(&mut CoreState<'_>) + Send + Sync,
{
    fn run(&self, state: &mut CoreState<'_>) {
        self(state)
    }
}

pub struct CoreParser {
    pub ruler: Ruler<Arc<dyn CoreRule>>,
}

impl CoreParser {
    pub fn new() -> Self {
        let mut ruler: Ruler<Arc<dyn CoreRule>> = Ruler::new();
        ruler.builtin("normalize", Arc::new(normalize), &[]);
        ruler.builtin("block", Arc::new(block), &[]);
        ruler.builtin("inline", Arc::new(inline), &[]);
        Self { ruler }
    }

    pub fn process(&self, state: &mut CoreState<'_>) {
        for rule in self.ruler.active() {
            rule.run(state);
        }
    }
}

impl Default for CoreParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Line endings to `\n`, NUL to U+FFFD.
fn normalize(state: &mut CoreState<'_>) {
    if state.src.contains(['\r', '\0']) {
        state.src = state
            .src
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\0', "\u{FFFD}");
    }
}

fn block(state: &mut CoreState<'_>) {
    let md = state.md;
    md.block.parse(&state.src, md, &mut state.tokens);
}

/// Fills the children of every `inline` token. Tokens a block rule already
/// filled are kept as they are.
fn inline(state: &mut CoreState<'_>) {
    let md = state.md;
    for token in state
        .tokens
        .iter_mut()
        .filter(|t| t.is("inline") && t.children.is_empty())
    {
        let mut children = Vec::new();
        md.inline.parse(&token.content, md, &mut children);
        token.children = children;
    }
}
