use std::collections::HashMap;

use crate::engine::Engine;
use crate::token::{Nesting, Token};

/// One run of `*` / `_` (or another plugin marker) awaiting a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub marker: u8,
    /// Length of the whole run this delimiter belongs to.
    pub length: usize,
    /// Index of the placeholder text token in the stream.
    pub token: usize,
    /// Index of the matching closer in the same list, once paired.
    pub end: Option<usize>,
    pub open: bool,
    pub close: bool,
}

/// Result of [`InlineState::scan_delims`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimRun {
    pub can_open: bool,
    pub can_close: bool,
    pub length: usize,
}

pub struct InlineState<'a> {
    pub src: &'a str,
    pub md: &'a Engine,
    pub tokens: &'a mut Vec<Token>,
    pub pos: usize,
    /// Exclusive upper bound of the scan window.
    pub pos_max: usize,
    pub level: usize,
    /// Plain text collected since the last token.
    pub pending: String,
    pending_level: usize,
    /// Delimiters of the innermost open scope.
    pub delimiters: Vec<Delimiter>,
    outer: Vec<Vec<Delimiter>>,
    closed: Vec<Vec<Delimiter>>,
    cache: HashMap<usize, usize>,
    pub(crate) backticks: HashMap<usize, usize>,
    pub(crate) backticks_scanned: bool,
    pub link_level: i32,
}

pub(crate) fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_punct(ch: char) -> bool {
    ch.is_ascii_punctuation()
        || matches!(
            ch,
            '\u{00A1}' | '\u{00A7}' | '\u{00AB}' | '\u{00B6}' | '\u{00B7}' | '\u{00BB}' | '\u{00BF}'
                | '\u{060C}' | '\u{061B}' | '\u{061F}' | '\u{066A}'..='\u{066D}' | '\u{06D4}'
                | '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{205E}' | '\u{3001}'..='\u{3003}'
        )
}

impl<'a> InlineState<'a> {
    pub fn new(src: &'a str, md: &'a Engine, tokens: &'a mut Vec<Token>) -> Self {
        Self {
            src,
            md,
            tokens,
            pos: 0,
            pos_max: src.len(),
            level: 0,
            pending: String::new(),
            pending_level: 0,
            delimiters: Vec::new(),
            outer: Vec::new(),
            closed: Vec::new(),
            cache: HashMap::new(),
            backticks: HashMap::new(),
            backticks_scanned: false,
            link_level: 0,
        }
    }

    /// Byte at `pos`, or `0` past the end of the source.
    pub fn byte(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Flushes pending text as a `text` token.
    pub fn push_pending(&mut self) {
        let mut token = Token::text(std::mem::take(&mut self.pending));
        token.level = self.pending_level;
        self.tokens.push(token);
    }

    /// Appends a token, flushing pending text first. Open tokens start a new
    /// delimiter scope; close tokens end it.
    pub fn push(
        &mut self,
        kind: &'static str,
        tag: &'static str,
        nesting: Nesting,
    ) -> &mut Token {
        if !self.pending.is_empty() {
            self.push_pending();
        }
        let mut token = Token::new(kind, tag, nesting);
        if nesting == Nesting::Close {
            self.level = self.level.saturating_sub(1);
            let inner = std::mem::replace(&mut self.delimiters, self.outer.pop().unwrap_or_default());
            self.closed.push(inner);
        }
        token.level = self.level;
        if nesting == Nesting::Open {
            self.level += 1;
            self.outer.push(std::mem::take(&mut self.delimiters));
        }
        self.pending_level = self.level;
        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Every delimiter list of this parse: the current scope, enclosing
    /// scopes and closed scopes.
    pub fn delimiter_lists(&self) -> impl Iterator<Item = &Vec<Delimiter>> {
        std::iter::once(&self.delimiters)
            .chain(self.outer.iter())
            .chain(self.closed.iter())
    }

    pub fn delimiter_lists_mut(&mut self) -> impl Iterator<Item = &mut Vec<Delimiter>> {
        std::iter::once(&mut self.delimiters)
            .chain(self.outer.iter_mut())
            .chain(self.closed.iter_mut())
    }

    /// Classifies the run of `src[start]` characters for emphasis-like
    /// pairing. `can_split_word` is false for intraword-restricted markers.
    pub fn scan_delims(&self, start: usize, can_split_word: bool) -> DelimRun {
        let marker = self.byte(start);
        let last_char = self.src[..start].chars().next_back().unwrap_or(' ');
        let mut pos = start;
        while pos < self.pos_max && self.byte(pos) == marker {
            pos += 1;
        }
        let length = pos - start;
        let next_char = self.src[pos..self.pos_max].chars().next().unwrap_or(' ');

        let last_punct = is_punct(last_char);
        let next_punct = is_punct(next_char);
        let last_white = last_char.is_whitespace();
        let next_white = next_char.is_whitespace();

        let left_flanking = !next_white && (!next_punct || last_white || last_punct);
        let right_flanking = !last_white && (!last_punct || next_white || next_punct);

        if can_split_word {
            DelimRun {
                can_open: left_flanking,
                can_close: right_flanking,
                length,
            }
        } else {
            DelimRun {
                can_open: left_flanking && (!right_flanking || last_punct),
                can_close: right_flanking && (!left_flanking || next_punct),
                length,
            }
        }
    }

    pub(crate) fn cached(&self, pos: usize) -> Option<usize> {
        self.cache.get(&pos).copied()
    }

    pub(crate) fn remember(&mut self, pos: usize, end: usize) {
        self.cache.insert(pos, end);
    }

    /// Byte length of the character at `pos`.
    pub fn char_len(&self, pos: usize) -> usize {
        self.src[pos..].chars().next().map_or(1, char::len_utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_flushes_pending_and_tracks_level() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let mut state = InlineState::new("", &md, &mut sink);
        state.pending.push_str("a");
        state.push("mark_open", "mark", Nesting::Open);
        state.pending.push_str("b");
        state.push("mark_close", "mark", Nesting::Close);
        let levels: Vec<(String, usize)> = sink.iter().map(|t| (t.kind.to_string(), t.level)).collect();
        assert_eq!(
            levels,
            vec![
                ("text".to_string(), 0),
                ("mark_open".to_string(), 0),
                ("text".to_string(), 1),
                ("mark_close".to_string(), 0)
            ]
        );
    }

    #[test]
    fn scan_delims_flanking() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let state = InlineState::new("a **b** c", &md, &mut sink);
        let open = state.scan_delims(2, true);
        assert!(open.can_open && !open.can_close);
        assert_eq!(open.length, 2);
        let close = state.scan_delims(5, true);
        assert!(!close.can_open && close.can_close);
    }

    #[test]
    fn underscore_inside_word_neither_opens_nor_closes() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let state = InlineState::new("snake_case", &md, &mut sink);
        let run = state.scan_delims(5, false);
        assert!(!run.can_open && !run.can_close);
    }
}
