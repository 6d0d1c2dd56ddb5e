//! # Inline Parsing
//!
//! Character-oriented rules run over the content of each `inline` token.
//!
//! At each position [`InlineParser::tokenize`] tries the enabled rules in
//! order; a rule that matches pushes tokens (or pending text) and advances
//! [`InlineState::pos`]. Unmatched characters accumulate as pending text.
//! After tokenizing, post rules pair delimiters and rewrite placeholder
//! tokens (`balance_pairs`, `emphasis`, `fragments_join`).
//!
//! Silent mode (`silent = true`) is used for look-ahead such as link label
//! scanning: a rule only reports whether it matches and how far it reaches.

pub mod kinds;
pub mod state;

use std::sync::Arc;

pub use state::{DelimRun, Delimiter, InlineState};

use crate::engine::Engine;
use crate::ruler::Ruler;
use crate::token::Token;

pub trait InlineRule: Send + Sync {
    fn run(&self, state: &mut InlineState<'_>, silent: bool) -> bool;
}

impl<F> InlineRule for F
where
    F: Fn(&mut InlineState<'_>, bool) -> bool + Send + Sync,
{
    fn run(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        self(state, silent)
    }
}

/// Runs once per inline token after tokenizing.
pub trait InlinePostRule: Send + Sync {
    fn run(&self, state: &mut InlineState<'_>);
}

impl<F> InlinePostRule for F
where
    F: Fn(&mut InlineState<'_>) + Send + Sync,
{
    fn run(&self, state: &mut InlineState<'_>) {
        self(state)
    }
}

pub struct InlineParser {
    pub ruler: Ruler<Arc<dyn InlineRule>>,
    pub post: Ruler<Arc<dyn InlinePostRule>>,
}

impl InlineParser {
    pub fn new() -> Self {
        let mut ruler: Ruler<Arc<dyn InlineRule>> = Ruler::new();
        ruler.builtin("text", Arc::new(kinds::text::text), &[]);
        ruler.builtin("newline", Arc::new(kinds::text::newline), &[]);
        ruler.builtin("escape", Arc::new(kinds::text::escape), &[]);
        ruler.builtin("backticks", Arc::new(kinds::code_span::backticks), &[]);
        ruler.builtin("emphasis", Arc::new(kinds::emphasis::tokenize), &[]);
        ruler.builtin("link", Arc::new(kinds::link::link), &[]);
        ruler.builtin("image", Arc::new(kinds::link::image), &[]);
        ruler.builtin("autolink", Arc::new(kinds::autolink::autolink), &[]);
        ruler.builtin("html_inline", Arc::new(kinds::autolink::html_inline), &[]);
        ruler.builtin("entity", Arc::new(kinds::text::entity), &[]);

        let mut post: Ruler<Arc<dyn InlinePostRule>> = Ruler::new();
        post.builtin("balance_pairs", Arc::new(kinds::emphasis::balance_pairs), &[]);
        post.builtin("emphasis", Arc::new(kinds::emphasis::post_process), &[]);
        post.builtin("fragments_join", Arc::new(kinds::text::fragments_join), &[]);

        Self { ruler, post }
    }

    /// Tokenizes `[state.pos, state.pos_max)`.
    pub fn tokenize(&self, state: &mut InlineState<'_>) {
        let end = state.pos_max;
        let max_nesting = state.md.options.max_nesting;

        while state.pos < end {
            let prev_pos = state.pos;
            let mut matched = false;
            if state.level < max_nesting {
                for rule in self.ruler.active() {
                    if rule.run(state, false) {
                        matched = state.pos > prev_pos;
                        if !matched {
                            log::warn!("inline rule matched at {prev_pos} without advancing");
                        }
                        break;
                    }
                }
            }
            if matched {
                if state.pos >= end {
                    break;
                }
                continue;
            }
            let src = state.src;
            let len = state.char_len(prev_pos);
            state.pending.push_str(&src[prev_pos..prev_pos + len]);
            state.pos = prev_pos + len;
        }

        if !state.pending.is_empty() {
            state.push_pending();
        }
    }

    /// Advances `state.pos` past the construct at the cursor without
    /// emitting tokens. Used by look-ahead scanners.
    pub fn skip_token(&self, state: &mut InlineState<'_>) {
        let pos = state.pos;
        if let Some(end) = state.cached(pos) {
            state.pos = end;
            return;
        }

        let mut matched = false;
        if state.level < state.md.options.max_nesting {
            for rule in self.ruler.active() {
                // raise the level to bound recursion through nested labels
                state.level += 1;
                let ok = rule.run(state, true);
                state.level -= 1;
                if ok {
                    matched = state.pos > pos;
                    break;
                }
            }
        } else {
            state.pos = state.pos_max;
        }
        if !matched && state.pos <= pos {
            state.pos = pos + state.char_len(pos);
        }
        state.remember(pos, state.pos);
    }

    /// Parses `src` into `tokens` with a fresh state, then runs post rules.
    pub fn parse(&self, src: &str, md: &Engine, tokens: &mut Vec<Token>) {
        let mut state = InlineState::new(src, md, tokens);
        self.tokenize(&mut state);
        for rule in self.post.active() {
            rule.run(&mut state);
        }
    }
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new()
    }
}
