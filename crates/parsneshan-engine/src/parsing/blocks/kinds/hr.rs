use crate::parsing::blocks::state::{BlockState, is_space};
use crate::token::Nesting;

/// Thematic break: three or more `*`, `-` or `_`, optionally spaced.
pub fn hr(state: &mut BlockState<'_>, start_line: usize, _end_line: usize, silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 {
        return false;
    }
    let mut pos = state.content_start(start_line);
    let max = state.lines[start_line].end;
    if pos >= max {
        return false;
    }
    let marker = state.byte(pos);
    if !matches!(marker, b'*' | b'-' | b'_') {
        return false;
    }
    pos += 1;

    let mut count = 1;
    while pos < max {
        let ch = state.byte(pos);
        pos += 1;
        if ch == marker {
            count += 1;
        } else if !is_space(ch) {
            return false;
        }
    }
    if count < 3 {
        return false;
    }
    if silent {
        return true;
    }

    state.line = start_line + 1;
    let token = state.push("hr", "hr", Nesting::SelfClosing);
    token.map = Some((start_line, start_line + 1));
    token.markup = (marker as char).to_string().repeat(count);
    true
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::Engine;

    #[rstest]
    #[case("---", true)]
    #[case("* * *", true)]
    #[case("___", true)]
    #[case("--", false)]
    #[case("-- a", false)]
    fn thematic_breaks(#[case] src: &str, #[case] is_hr: bool) {
        let md = Engine::default();
        assert_eq!(md.parse(src)[0].is("hr"), is_hr);
    }
}
