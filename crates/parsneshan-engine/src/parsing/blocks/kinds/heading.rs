use crate::parsing::blocks::kinds::interrupted;
use crate::parsing::blocks::state::{BlockContext, BlockState, is_space};
use crate::token::Nesting;

const TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const HASHES: &str = "######";

/// ATX heading: `#` to `######` followed by a space or end of line.
pub fn heading(state: &mut BlockState<'_>, start_line: usize, _end_line: usize, silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 {
        return false;
    }
    let mut pos = state.content_start(start_line);
    let mut max = state.lines[start_line].end;
    if pos >= max || state.byte(pos) != b'#' {
        return false;
    }

    let mut level = 1;
    pos += 1;
    while pos < max && state.byte(pos) == b'#' && level <= 6 {
        level += 1;
        pos += 1;
    }
    if level > 6 || (pos < max && !is_space(state.byte(pos))) {
        return false;
    }
    if silent {
        return true;
    }

    // closing sequence: `## title ##`
    max = state.skip_spaces_back(max, pos);
    let tail = state.skip_chars_back(max, b'#', pos);
    if tail > pos && is_space(state.byte(tail - 1)) {
        max = tail;
    }

    state.line = start_line + 1;
    let map = Some((start_line, state.line));
    let tag = TAGS[level - 1];
    let markup = &HASHES[..level];
    let content = state.src[pos..max].trim().to_string();

    let open = state.push("heading_open", tag, Nesting::Open);
    open.markup = markup.to_string();
    open.map = map;
    let inline = state.push("inline", "", Nesting::SelfClosing);
    inline.content = content;
    inline.map = map;
    state.push("heading_close", tag, Nesting::Close).markup = markup.to_string();
    true
}

/// Setext heading: paragraph text underlined with `=` (h1) or `-` (h2).
pub fn lheading(state: &mut BlockState<'_>, start_line: usize, end_line: usize, _silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 {
        return false;
    }
    let old_parent = state.parent;
    state.parent = BlockContext::Paragraph;

    let mut level = 0;
    let mut marker = 0u8;
    let mut next_line = start_line + 1;
    while next_line < end_line && !state.is_empty(next_line) {
        if state.relative_indent(next_line) > 3 {
            next_line += 1;
            continue;
        }
        if state.indent(next_line) >= state.blk_indent {
            let mut pos = state.content_start(next_line);
            let max = state.lines[next_line].end;
            if pos < max {
                let ch = state.byte(pos);
                if ch == b'-' || ch == b'=' {
                    pos = state.skip_chars(pos, ch);
                    pos = state.skip_spaces(pos);
                    if pos >= max {
                        marker = ch;
                        level = if ch == b'=' { 1 } else { 2 };
                        break;
                    }
                }
            }
        }
        if state.indent(next_line) < 0 {
            next_line += 1;
            continue;
        }
        if interrupted(state, "paragraph", next_line, end_line) {
            break;
        }
        next_line += 1;
    }

    if level == 0 {
        state.parent = old_parent;
        return false;
    }

    let content = state
        .get_lines(start_line, next_line, state.blk_indent, false)
        .trim()
        .to_string();
    state.line = next_line + 1;
    let tag = TAGS[level - 1];
    let markup = (marker as char).to_string();

    let open = state.push("heading_open", tag, Nesting::Open);
    open.markup = markup.clone();
    open.map = Some((start_line, next_line + 1));
    let inline = state.push("inline", "", Nesting::SelfClosing);
    inline.content = content;
    inline.map = Some((start_line, next_line));
    state.push("heading_close", tag, Nesting::Close).markup = markup;

    state.parent = old_parent;
    true
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::Engine;

    #[rstest]
    #[case("# a", "h1", "a")]
    #[case("###### deep", "h6", "deep")]
    #[case("## closed ##", "h2", "closed")]
    #[case("## سلام دنیا!", "h2", "سلام دنیا!")]
    #[case("title\n===", "h1", "title")]
    #[case("title\n---", "h2", "title")]
    fn headings(#[case] src: &str, #[case] tag: &str, #[case] content: &str) {
        let md = Engine::default();
        let tokens = md.parse(src);
        assert_eq!(tokens[0].kind, "heading_open");
        assert_eq!(tokens[0].tag, tag);
        assert_eq!(tokens[1].content, content);
    }

    #[rstest]
    #[case("####### seven")]
    #[case("#hashtag")]
    fn not_headings(#[case] src: &str) {
        let md = Engine::default();
        assert_eq!(md.parse(src)[0].kind, "paragraph_open");
    }
}
