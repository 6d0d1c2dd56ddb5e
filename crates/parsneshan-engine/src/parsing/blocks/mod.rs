//! # Block Parsing
//!
//! Line-oriented rules dispatched in priority order at each line.
//!
//! ## Dispatch
//!
//! At every non-empty line inside the window, [`BlockParser::tokenize`] tries
//! each enabled rule with `silent = false` until one returns `true`. A
//! matching rule must push its tokens and move [`BlockState::line`] past the
//! construct. Rules whose name appears in another rule's alternate chain
//! (`paragraph`, `blockquote`, `list`, `reference`) are also run in silent
//! mode by that rule to decide whether a line interrupts it.
//!
//! ## Modules
//!
//! - **`state`**: [`BlockState`] with the line table and scanning helpers
//! - **`kinds`**: the default rules, one module per construct
//!
//! ## Key Invariants
//!
//! - Rules never read lines at or beyond `end_line`
//! - Container rules restore any [`LineMarks`] they patch
//! - Silent mode advances nothing but the return value

pub mod kinds;
pub mod state;

use std::sync::Arc;

pub use state::{BlockContext, BlockState, LineMarks};

use crate::engine::Engine;
use crate::ruler::Ruler;
use crate::token::Token;

pub trait BlockRule: Send + Sync {
    fn run(&self, state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool)
    -> bool;
}

impl<F> BlockRule for F
where
    F: Fn(&mut BlockState<'_>, usize, usize, bool) -> bool + Send + Sync,
{
    fn run(
        &self,
        state: &mut BlockState<'_>,
        start_line: usize,
        end_line: usize,
        silent: bool,
    ) -> bool {
        self(state, start_line, end_line, silent)
    }
}

pub struct BlockParser {
    pub ruler: Ruler<Arc<dyn BlockRule>>,
}

impl BlockParser {
    pub fn new() -> Self {
        const INTERRUPTS: &[&str] = &["paragraph", "reference", "blockquote", "list"];

        let mut ruler: Ruler<Arc<dyn BlockRule>> = Ruler::new();
        ruler.builtin("table", Arc::new(kinds::table::table), &["paragraph", "reference"]);
        ruler.builtin("code", Arc::new(kinds::code::code), &[]);
        ruler.builtin("fence", Arc::new(kinds::fence::fence), INTERRUPTS);
        ruler.builtin("blockquote", Arc::new(kinds::blockquote::blockquote), INTERRUPTS);
        ruler.builtin("hr", Arc::new(kinds::hr::hr), INTERRUPTS);
        ruler.builtin("list", Arc::new(kinds::list::list), &["paragraph", "reference", "blockquote"]);
        ruler.builtin("heading", Arc::new(kinds::heading::heading), &["paragraph", "reference", "blockquote"]);
        ruler.builtin("lheading", Arc::new(kinds::heading::lheading), &[]);
        ruler.builtin(
            "html_block",
            Arc::new(kinds::html_block::html_block),
            &["paragraph", "reference", "blockquote"],
        );
        ruler.builtin("paragraph", Arc::new(kinds::paragraph::paragraph), &[]);
        Self { ruler }
    }

    /// Runs the block rules over lines `[start_line, end_line)`.
    pub fn tokenize(&self, state: &mut BlockState<'_>, start_line: usize, end_line: usize) {
        let max_nesting = state.md.options.max_nesting;
        let mut line = start_line;
        let mut has_empty_lines = false;

        while line < end_line {
            line = state.skip_empty_lines(line);
            state.line = line;
            if line >= end_line {
                break;
            }
            // dedented below the container: the caller takes over
            if state.lines[line].indent < state.blk_indent {
                break;
            }
            if state.level >= max_nesting {
                log::warn!("block nesting limit {max_nesting} reached at line {line}");
                state.line = end_line;
                break;
            }

            let prev_line = state.line;
            let mut matched = false;
            for rule in self.ruler.active() {
                if rule.run(state, line, end_line, false) {
                    matched = true;
                    break;
                }
            }
            if !matched || state.line <= prev_line {
                log::warn!("no block rule consumed line {line}; skipping it");
                state.line = prev_line + 1;
            }

            state.tight = !has_empty_lines;
            if state.line > 0 && state.is_empty(state.line - 1) {
                has_empty_lines = true;
            }

            line = state.line;
            if line < end_line && state.is_empty(line) {
                has_empty_lines = true;
                line += 1;
                state.line = line;
            }
        }
    }

    /// Parses `src` as a top-level document, appending to `tokens`.
    pub fn parse(&self, src: &str, md: &Engine, tokens: &mut Vec<Token>) {
        self.parse_nested(src, md, tokens, 0);
    }

    /// Parses `src` as its own document whose tokens start at `level`,
    /// appending them to `sink`. Used by rules that re-enter the block
    /// parser on a captured region.
    pub fn parse_nested(&self, src: &str, md: &Engine, sink: &mut Vec<Token>, level: usize) {
        if src.is_empty() {
            return;
        }
        let mut state = BlockState::new(src, md, sink);
        state.level = level;
        let end = state.line_max;
        self.tokenize(&mut state, 0, end);
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Nesting;

    #[test]
    fn default_rule_order() {
        let parser = BlockParser::new();
        assert_eq!(
            parser.ruler.names(),
            vec![
                "table",
                "code",
                "fence",
                "blockquote",
                "hr",
                "list",
                "heading",
                "lheading",
                "html_block",
                "paragraph"
            ]
        );
    }

    #[test]
    fn parse_nested_offsets_levels() {
        let md = Engine::default();
        let mut sink = Vec::new();
        md.block.parse_nested("para", &md, &mut sink, 3);
        let levels: Vec<usize> = sink.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![3, 4, 3]);
    }

    #[test]
    fn unmatched_lines_are_skipped() {
        let mut md = Engine::default();
        md.block.ruler.disable("paragraph").unwrap();
        let tokens = md.parse("just text\n\n# heading");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, "heading_open");
        assert_eq!(tokens[0].nesting, Nesting::Open);
    }
}
