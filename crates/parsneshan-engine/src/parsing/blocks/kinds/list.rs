use crate::parsing::blocks::kinds::interrupted;
use crate::parsing::blocks::state::{BlockContext, BlockState, is_space};
use crate::token::Nesting;

pub struct ListMarker;

impl ListMarker {
    /// Ordered markers hold at most this many digits.
    pub const MAX_DIGITS: usize = 9;

    /// Position after a `-`, `+` or `*` bullet, if the line starts with one.
    pub fn bullet(state: &BlockState<'_>, line: usize) -> Option<usize> {
        let max = state.lines[line].end;
        let mut pos = state.content_start(line);
        if pos >= max || !matches!(state.byte(pos), b'*' | b'-' | b'+') {
            return None;
        }
        pos += 1;
        if pos < max && !is_space(state.byte(pos)) {
            return None;
        }
        Some(pos)
    }

    /// Position after a `1.` / `1)` marker, if the line starts with one.
    pub fn ordered(state: &BlockState<'_>, line: usize) -> Option<usize> {
        let start = state.content_start(line);
        let max = state.lines[line].end;
        let mut pos = start;
        if pos + 1 >= max || !state.byte(pos).is_ascii_digit() {
            return None;
        }
        pos += 1;
        loop {
            if pos >= max {
                return None;
            }
            let ch = state.byte(pos);
            pos += 1;
            if ch.is_ascii_digit() {
                if pos - start > Self::MAX_DIGITS {
                    return None;
                }
                continue;
            }
            if ch == b')' || ch == b'.' {
                break;
            }
            return None;
        }
        if pos < max && !is_space(state.byte(pos)) {
            return None;
        }
        Some(pos)
    }
}

/// Hides the paragraphs directly inside the items of a tight list.
fn mark_tight_paragraphs(state: &mut BlockState<'_>, idx: usize) {
    let level = state.level + 2;
    let len = state.tokens.len();
    let mut i = idx + 2;
    while i + 2 < len {
        if state.tokens[i].level == level && state.tokens[i].is("paragraph_open") {
            state.tokens[i].hidden = true;
            state.tokens[i + 2].hidden = true;
            i += 2;
        }
        i += 1;
    }
}

pub fn list(state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 {
        return false;
    }
    // deeply indented marker under a list item is a paragraph continuation
    if state.list_indent >= 0
        && state.indent(start_line) - state.list_indent >= 4
        && state.indent(start_line) < state.blk_indent
    {
        return false;
    }

    let terminating_paragraph = silent
        && state.parent == BlockContext::Paragraph
        && state.indent(start_line) >= state.blk_indent;

    let mut marker_start = state.content_start(start_line);
    let (ordered, mut after_marker, start_number) = match ListMarker::ordered(state, start_line) {
        Some(pos) => {
            let number: u64 = state.src[marker_start..pos - 1].parse().unwrap_or(1);
            // only `1.` may interrupt a paragraph
            if terminating_paragraph && number != 1 {
                return false;
            }
            (true, pos, number)
        }
        None => match ListMarker::bullet(state, start_line) {
            Some(pos) => (false, pos, 1),
            None => return false,
        },
    };

    // an empty item may not interrupt a paragraph
    if terminating_paragraph && state.skip_spaces(after_marker) >= state.lines[start_line].end {
        return false;
    }
    if silent {
        return true;
    }

    let marker_char = state.byte(after_marker - 1);
    let markup = (marker_char as char).to_string();
    let (open_kind, close_kind, tag) = if ordered {
        ("ordered_list_open", "ordered_list_close", "ol")
    } else {
        ("bullet_list_open", "bullet_list_close", "ul")
    };

    let list_idx = state.tokens.len();
    let open = state.push(open_kind, tag, Nesting::Open);
    open.markup = markup.clone();
    if ordered && start_number != 1 {
        open.attr_set("start", start_number.to_string());
    }

    let mut tight = true;
    let mut prev_empty_end = false;
    let old_parent = state.parent;
    state.parent = BlockContext::List;

    let mut next_line = start_line;
    let mut item_line = start_line;
    while next_line < end_line {
        let marks = state.lines[next_line];
        let max = marks.end;
        let initial = marks.indent + (after_marker - state.content_start(next_line)) as i32;
        let mut offset = initial;
        let mut pos = after_marker;
        while pos < max {
            match state.byte(pos) {
                b'\t' => offset += 4 - (offset + marks.base) % 4,
                b' ' => offset += 1,
                _ => break,
            }
            pos += 1;
        }
        let content_start = pos;
        let mut indent_after_marker = if content_start >= max { 1 } else { offset - initial };
        // more than four spaces: the rest is an indented code block
        if indent_after_marker > 4 {
            indent_after_marker = 1;
        }
        let indent = initial + indent_after_marker;

        let item_idx = state.tokens.len();
        let info = if ordered {
            state.src[marker_start..after_marker - 1].to_string()
        } else {
            String::new()
        };
        let item = state.push("list_item_open", "li", Nesting::Open);
        item.markup = markup.clone();
        item.info = info;

        let old_tight = state.tight;
        let old_list_indent = state.list_indent;
        state.list_indent = state.blk_indent;
        state.blk_indent = indent;
        state.tight = true;
        state.lines[next_line].shift = content_start - marks.begin;
        state.lines[next_line].indent = offset;

        if content_start >= max && state.is_empty(next_line + 1) {
            // empty item followed by a blank line ends the list
            state.line = (next_line + 2).min(end_line);
        } else {
            let md = state.md;
            md.block.tokenize(state, next_line, end_line);
        }

        if !state.tight || prev_empty_end {
            tight = false;
        }
        // trailing blank line makes the item loose unless the list ends
        prev_empty_end = state.line - next_line > 1 && state.is_empty(state.line - 1);

        state.blk_indent = state.list_indent;
        state.list_indent = old_list_indent;
        state.lines[next_line].shift = marks.shift;
        state.lines[next_line].indent = marks.indent;
        state.tight = old_tight;

        state.push("list_item_close", "li", Nesting::Close).markup = markup.clone();
        next_line = state.line;
        state.tokens[item_idx].map = Some((item_line, next_line));
        item_line = next_line;

        if next_line >= end_line {
            break;
        }
        if state.indent(next_line) < state.blk_indent {
            break;
        }
        if state.relative_indent(next_line) >= 4 {
            break;
        }
        if interrupted(state, "list", next_line, end_line) {
            break;
        }

        let next_marker = if ordered {
            ListMarker::ordered(state, next_line)
        } else {
            ListMarker::bullet(state, next_line)
        };
        match next_marker {
            Some(pos) => {
                after_marker = pos;
                marker_start = state.content_start(next_line);
            }
            None => break,
        }
        if state.byte(after_marker - 1) != marker_char {
            break;
        }
    }

    state.push(close_kind, tag, Nesting::Close).markup = markup;
    state.tokens[list_idx].map = Some((start_line, next_line));
    state.line = next_line;
    state.parent = old_parent;

    if tight {
        mark_tight_paragraphs(state, list_idx);
    }
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::Engine;

    #[test]
    fn tight_list_hides_paragraphs() {
        let md = Engine::default();
        let tokens = md.parse("- a\n- b");
        let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_ref()).collect();
        assert_eq!(
            kinds,
            vec![
                "bullet_list_open",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "list_item_open",
                "paragraph_open",
                "inline",
                "paragraph_close",
                "list_item_close",
                "bullet_list_close"
            ]
        );
        assert!(tokens[2].hidden && tokens[4].hidden);
    }

    #[test]
    fn loose_list_keeps_paragraphs() {
        let md = Engine::default();
        let html = md.render("- a\n\n- b").unwrap();
        assert_eq!(html, "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n");
    }

    #[rstest]
    #[case("1. a\n2. b", "<ol>\n<li>a</li>\n<li>b</li>\n</ol>\n")]
    #[case("3) a", "<ol start=\"3\">\n<li>a</li>\n</ol>\n")]
    #[case("- a\n  - b", "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n")]
    #[case("- a\n+ b", "<ul>\n<li>a</li>\n</ul>\n<ul>\n<li>b</li>\n</ul>\n")]
    fn lists(#[case] src: &str, #[case] expected: &str) {
        let md = Engine::default();
        assert_eq!(md.render(src).unwrap(), expected);
    }

    #[test]
    fn items_record_their_number() {
        let md = Engine::default();
        let info: Vec<String> = md
            .parse("7. a\n8. b\n\n- c")
            .into_iter()
            .filter(|t| t.is("list_item_open"))
            .map(|t| t.info)
            .collect();
        assert_eq!(info, vec!["7", "8", ""]);
    }

    #[test]
    fn only_one_may_interrupt_a_paragraph() {
        let md = Engine::default();
        assert_eq!(md.render("text\n2. no").unwrap(), "<p>text\n2. no</p>\n");
    }
}
