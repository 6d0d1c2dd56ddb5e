use crate::parsing::blocks::kinds::interrupted;
use crate::parsing::blocks::state::{BlockContext, BlockState, LineMarks, is_space};
use crate::token::Nesting;

pub struct BlockQuote;

impl BlockQuote {
    pub const MARKER: u8 = b'>';
}

/// `>` quote. Quoted lines are re-tokenized in place: each line's marks are
/// patched to start after the marker, then restored once the nested pass
/// is done.
pub fn blockquote(state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 {
        return false;
    }
    if state.byte(state.content_start(start_line)) != BlockQuote::MARKER {
        return false;
    }
    // the rest cannot fail
    if silent {
        return true;
    }

    let old_line_max = state.line_max;
    let old_parent = state.parent;
    state.parent = BlockContext::BlockQuote;

    let mut saved: Vec<LineMarks> = Vec::new();
    let mut last_line_empty = false;
    let mut next_line = start_line;

    while next_line < end_line {
        let outdented = state.indent(next_line) < state.blk_indent;
        let mut pos = state.content_start(next_line);
        let max = state.lines[next_line].end;
        if pos >= max {
            // blank line outside the quote
            break;
        }

        if state.byte(pos) == BlockQuote::MARKER && !outdented {
            pos += 1;
            let marks = state.lines[next_line];
            let mut initial = marks.indent + 1;
            let space_after_marker;
            let mut adjust_tab = false;

            match state.byte(pos) {
                b' ' => {
                    pos += 1;
                    initial += 1;
                    space_after_marker = true;
                }
                b'\t' => {
                    space_after_marker = true;
                    if (marks.base + initial) % 4 == 3 {
                        pos += 1;
                        initial += 1;
                    } else {
                        adjust_tab = true;
                    }
                }
                _ => space_after_marker = false,
            }

            let mut offset = initial;
            saved.push(marks);
            let begin = pos;
            while pos < max {
                let ch = state.byte(pos);
                if !is_space(ch) {
                    break;
                }
                if ch == b'\t' {
                    offset += 4 - (offset + marks.base + i32::from(adjust_tab)) % 4;
                } else {
                    offset += 1;
                }
                pos += 1;
            }
            last_line_empty = pos >= max;

            state.lines[next_line] = LineMarks {
                begin,
                end: marks.end,
                shift: pos - begin,
                indent: offset - initial,
                base: marks.indent + 1 + i32::from(space_after_marker),
            };
            next_line += 1;
            continue;
        }

        // lazy line after an empty quoted line ends the quote
        if last_line_empty {
            break;
        }

        if interrupted(state, "blockquote", next_line, end_line) {
            // the terminator must not be swallowed as paragraph continuation
            state.line_max = next_line;
            if state.blk_indent != 0 {
                saved.push(state.lines[next_line]);
                state.lines[next_line].indent -= state.blk_indent;
            }
            break;
        }

        saved.push(state.lines[next_line]);
        // negative indent marks a paragraph continuation
        state.lines[next_line].indent = -1;
        next_line += 1;
    }

    let old_indent = state.blk_indent;
    state.blk_indent = 0;

    let open_idx = state.tokens.len();
    state.push("blockquote_open", "blockquote", Nesting::Open).markup = ">".to_string();
    let md = state.md;
    md.block.tokenize(state, start_line, next_line);
    state.push("blockquote_close", "blockquote", Nesting::Close).markup = ">".to_string();
    state.tokens[open_idx].map = Some((start_line, state.line));

    state.line_max = old_line_max;
    state.parent = old_parent;
    for (i, marks) in saved.into_iter().enumerate() {
        state.lines[start_line + i] = marks;
    }
    state.blk_indent = old_indent;
    true
}
