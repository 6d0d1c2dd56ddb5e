use crate::engine::Engine;
use crate::token::{Nesting, Token};

/// Per-line offsets into the block source.
///
/// `shift` is the byte width of leading whitespace; `indent` is its column
/// width with tabs expanded to 4-column stops; `base` is the column the line
/// starts at inside its container, used when expanding tabs. Container rules
/// patch these temporarily and restore them before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineMarks {
    pub begin: usize,
    pub end: usize,
    pub shift: usize,
    pub indent: i32,
    pub base: i32,
}

/// Which container the block rules are currently running inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContext {
    Root,
    BlockQuote,
    List,
    Paragraph,
    Table,
}

pub struct BlockState<'a> {
    pub src: &'a str,
    pub md: &'a Engine,
    pub tokens: &'a mut Vec<Token>,
    /// One entry per line plus a fake trailing entry at `src.len()`.
    pub lines: Vec<LineMarks>,
    /// Required column indent of the current container.
    pub blk_indent: i32,
    pub line: usize,
    pub line_max: usize,
    /// Loose/tight flag of the list being parsed.
    pub tight: bool,
    /// Indent of the current list item, `-1` outside lists.
    pub list_indent: i32,
    pub parent: BlockContext,
    pub level: usize,
}

pub(crate) fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

impl<'a> BlockState<'a> {
    pub fn new(src: &'a str, md: &'a Engine, tokens: &'a mut Vec<Token>) -> Self {
        let bytes = src.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut shift = 0;
        let mut indent = 0i32;
        let mut indent_found = false;
        let mut pos = 0;
        while pos < bytes.len() {
            let ch = bytes[pos];
            if !indent_found {
                if is_space(ch) {
                    shift += 1;
                    if ch == b'\t' {
                        indent += 4 - indent % 4;
                    } else {
                        indent += 1;
                    }
                    pos += 1;
                    continue;
                }
                indent_found = true;
            }
            if ch == b'\n' || pos == bytes.len() - 1 {
                let end = if ch == b'\n' { pos } else { pos + 1 };
                lines.push(LineMarks {
                    begin: start,
                    end,
                    shift,
                    indent,
                    base: 0,
                });
                indent_found = false;
                shift = 0;
                indent = 0;
                start = end + 1;
                pos = end;
            }
            pos += 1;
        }
        let line_max = lines.len();
        lines.push(LineMarks {
            begin: src.len(),
            end: src.len(),
            ..LineMarks::default()
        });

        Self {
            src,
            md,
            tokens,
            lines,
            blk_indent: 0,
            line: 0,
            line_max,
            tight: false,
            list_indent: -1,
            parent: BlockContext::Root,
            level: 0,
        }
    }

    /// Appends a block token and maintains `level`.
    pub fn push(
        &mut self,
        kind: &'static str,
        tag: &'static str,
        nesting: Nesting,
    ) -> &mut Token {
        let mut token = Token::new(kind, tag, nesting);
        token.block = true;
        if nesting == Nesting::Close {
            self.level = self.level.saturating_sub(1);
        }
        token.level = self.level;
        if nesting == Nesting::Open {
            self.level += 1;
        }
        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Byte at `pos`, or `0` past the end of the source.
    pub fn byte(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Start of the line's content, past leading whitespace.
    pub fn content_start(&self, line: usize) -> usize {
        self.lines[line].begin + self.lines[line].shift
    }

    pub fn is_empty(&self, line: usize) -> bool {
        self.content_start(line) >= self.lines[line].end
    }

    /// The line's content after leading whitespace, without the newline.
    pub fn line_text(&self, line: usize) -> &'a str {
        let start = self.content_start(line);
        let end = self.lines[line].end;
        if start >= end {
            return "";
        }
        &self.src[start..end]
    }

    /// Byte offset where `line` begins.
    pub fn begin(&self, line: usize) -> usize {
        self.lines[line].begin
    }

    pub fn indent(&self, line: usize) -> i32 {
        self.lines[line].indent
    }

    /// Column indent of `line` relative to the current container; negative
    /// when the line sits left of it.
    pub fn relative_indent(&self, line: usize) -> i32 {
        self.lines[line].indent - self.blk_indent
    }

    pub fn skip_empty_lines(&self, mut from: usize) -> usize {
        while from < self.line_max {
            if !self.is_empty(from) {
                break;
            }
            from += 1;
        }
        from
    }

    pub fn skip_spaces(&self, mut pos: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() && is_space(bytes[pos]) {
            pos += 1;
        }
        pos
    }

    pub fn skip_spaces_back(&self, mut pos: usize, min: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos > min {
            if !is_space(bytes[pos - 1]) {
                return pos;
            }
            pos -= 1;
        }
        pos
    }

    pub fn skip_chars(&self, mut pos: usize, ch: u8) -> usize {
        let bytes = self.src.as_bytes();
        while pos < bytes.len() && bytes[pos] == ch {
            pos += 1;
        }
        pos
    }

    pub fn skip_chars_back(&self, mut pos: usize, ch: u8, min: usize) -> usize {
        let bytes = self.src.as_bytes();
        while pos > min {
            if bytes[pos - 1] != ch {
                return pos;
            }
            pos -= 1;
        }
        pos
    }

    /// Joins lines `[begin, end)`, stripping up to `indent` columns from
    /// each. Tabs that straddle the indent are partially expanded.
    pub fn get_lines(&self, begin: usize, end: usize, indent: i32, keep_last_lf: bool) -> String {
        if begin >= end {
            return String::new();
        }
        let bytes = self.src.as_bytes();
        let mut out = String::new();
        for line in begin..end {
            let marks = self.lines[line];
            let mut line_indent = 0i32;
            let mut first = marks.begin;
            let last = if line + 1 < end || keep_last_lf {
                (marks.end + 1).min(self.src.len())
            } else {
                marks.end
            };

            while first < last && line_indent < indent {
                let ch = bytes[first];
                if is_space(ch) {
                    if ch == b'\t' {
                        line_indent += 4 - (line_indent + marks.base) % 4;
                    } else {
                        line_indent += 1;
                    }
                } else if first - marks.begin < marks.shift {
                    // patched shift masks container markers as indentation
                    line_indent += 1;
                } else {
                    break;
                }
                first += 1;
            }

            if line_indent > indent {
                out.extend(std::iter::repeat_n(' ', (line_indent - indent) as usize));
            }
            out.push_str(&self.src[first..last]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn line_table_has_fake_trailing_entry() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let state = BlockState::new("ab\n  cd\n", &md, &mut sink);
        assert_eq!(state.line_max, 2);
        assert_eq!(
            state.lines,
            vec![
                LineMarks { begin: 0, end: 2, shift: 0, indent: 0, base: 0 },
                LineMarks { begin: 3, end: 7, shift: 2, indent: 2, base: 0 },
                LineMarks { begin: 8, end: 8, shift: 0, indent: 0, base: 0 },
            ]
        );
    }

    #[test]
    fn tabs_expand_to_four_column_stops() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let state = BlockState::new(" \tx", &md, &mut sink);
        assert_eq!(state.lines[0].shift, 2);
        assert_eq!(state.lines[0].indent, 4);
    }

    #[test]
    fn line_text_excludes_indent_and_newline() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let state = BlockState::new("   ...توجه\n", &md, &mut sink);
        assert_eq!(state.line_text(0), "...توجه");
    }

    #[test]
    fn get_lines_strips_indent() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let state = BlockState::new("    a\n      b\n", &md, &mut sink);
        assert_eq!(state.get_lines(0, 2, 4, false), "a\n  b");
    }

    #[test]
    fn push_tracks_level() {
        let md = Engine::default();
        let mut sink = Vec::new();
        let mut state = BlockState::new("", &md, &mut sink);
        state.push("div_open", "div", Nesting::Open);
        let inner = state.push("p_open", "p", Nesting::Open).level;
        state.push("p_close", "p", Nesting::Close);
        let outer = state.push("div_close", "div", Nesting::Close).level;
        assert_eq!((inner, outer, state.level), (1, 0, 0));
    }
}
