use crate::parsing::blocks::state::BlockState;
use crate::token::Nesting;

pub struct Fence;

impl Fence {
    pub const BACKTICK: u8 = b'`';
    pub const TILDE: u8 = b'~';
    pub const MIN_LEN: usize = 3;
}

/// Fenced code block. An unclosed fence runs to the end of the window.
pub fn fence(state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 {
        return false;
    }
    let mut pos = state.content_start(start_line);
    let max = state.lines[start_line].end;
    if pos + Fence::MIN_LEN > max {
        return false;
    }
    let marker = state.byte(pos);
    if marker != Fence::BACKTICK && marker != Fence::TILDE {
        return false;
    }

    let mem = pos;
    pos = state.skip_chars(pos, marker);
    let len = pos - mem;
    if len < Fence::MIN_LEN {
        return false;
    }
    let markup = &state.src[mem..pos];
    let params = &state.src[pos..max];
    if marker == Fence::BACKTICK && params.contains('`') {
        return false;
    }
    if silent {
        return true;
    }

    let mut next_line = start_line;
    let mut have_end_marker = false;
    loop {
        next_line += 1;
        if next_line >= end_line {
            break;
        }
        let mem = state.content_start(next_line);
        let max = state.lines[next_line].end;
        if mem < max && state.indent(next_line) < state.blk_indent {
            // non-empty line left of the container ends the fence
            break;
        }
        if state.byte(mem) != marker || state.relative_indent(next_line) >= 4 {
            continue;
        }
        let pos = state.skip_chars(mem, marker);
        if pos - mem < len {
            continue;
        }
        if state.skip_spaces(pos) < max {
            continue;
        }
        have_end_marker = true;
        break;
    }

    let indent = state.indent(start_line);
    state.line = next_line + usize::from(have_end_marker);
    let content = state.get_lines(start_line + 1, next_line, indent, true);
    let token = state.push("fence", "code", Nesting::SelfClosing);
    token.info = params.to_string();
    token.content = content;
    token.markup = markup.to_string();
    token.map = Some((start_line, next_line + usize::from(have_end_marker)));
    true
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::Engine;

    #[rstest]
    #[case("```rust\nfn main() {}\n```", "rust", "fn main() {}\n")]
    #[case("~~~\n۱. x\n~~~", "", "۱. x\n")]
    #[case("````\n```\n````", "", "```\n")]
    #[case("```\nunclosed", "", "unclosed")]
    fn fences(#[case] src: &str, #[case] info: &str, #[case] content: &str) {
        let md = Engine::default();
        let tokens = md.parse(src);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, "fence");
        assert_eq!(tokens[0].info, info);
        assert_eq!(tokens[0].content, content);
    }

    #[test]
    fn backtick_info_may_not_contain_backticks() {
        let md = Engine::default();
        assert_eq!(md.parse("``` a`b")[0].kind, "paragraph_open");
    }
}
