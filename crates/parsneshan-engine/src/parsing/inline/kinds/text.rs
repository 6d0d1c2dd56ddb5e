use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::inline::state::{InlineState, is_space};
use crate::token::{Nesting, Token};

/// Characters at which some other inline rule might start.
fn is_terminator(b: u8) -> bool {
    matches!(
        b,
        b'\n' | b'!' | b'#' | b'$' | b'%' | b'&' | b'*' | b'+' | b'-' | b':' | b'<' | b'='
            | b'@' | b'[' | b'\\' | b']' | b'^' | b'_' | b'`' | b'{' | b'}' | b'~'
    )
}

/// Swallows a run of characters no other rule cares about.
pub fn text(state: &mut InlineState<'_>, silent: bool) -> bool {
    let start = state.pos;
    let mut pos = start;
    while pos < state.pos_max && !is_terminator(state.byte(pos)) {
        pos += 1;
    }
    if pos == start {
        return false;
    }
    if !silent {
        let src = state.src;
        state.pending.push_str(&src[start..pos]);
    }
    state.pos = pos;
    true
}

/// `\n`: soft break, or hard break after two trailing spaces.
pub fn newline(state: &mut InlineState<'_>, silent: bool) -> bool {
    let mut pos = state.pos;
    if state.byte(pos) != b'\n' {
        return false;
    }
    if !silent {
        let trailing = state.pending.len() - state.pending.trim_end_matches(' ').len();
        let kept = state.pending.len() - trailing;
        state.pending.truncate(kept);
        if trailing >= 2 {
            state.push("hardbreak", "br", Nesting::SelfClosing);
        } else {
            state.push("softbreak", "br", Nesting::SelfClosing);
        }
    }
    pos += 1;
    while pos < state.pos_max && is_space(state.byte(pos)) {
        pos += 1;
    }
    state.pos = pos;
    true
}

const ESCAPABLE: &str = "\\!\"#$%&'()*+,./:;<=>?@[]^_`{|}~-";

/// Backslash escapes and backslash hard breaks.
pub fn escape(state: &mut InlineState<'_>, silent: bool) -> bool {
    let mut pos = state.pos;
    if state.byte(pos) != b'\\' {
        return false;
    }
    pos += 1;
    if pos >= state.pos_max {
        return false;
    }

    if state.byte(pos) == b'\n' {
        if !silent {
            state.push("hardbreak", "br", Nesting::SelfClosing);
        }
        pos += 1;
        while pos < state.pos_max && is_space(state.byte(pos)) {
            pos += 1;
        }
        state.pos = pos;
        return true;
    }

    let len = state.char_len(pos);
    let src = state.src;
    let escaped = &src[pos..pos + len];
    if !silent {
        if escaped.len() == 1 && ESCAPABLE.contains(escaped) {
            state.pending.push_str(escaped);
        } else {
            state.pending.push('\\');
            state.pending.push_str(escaped);
        }
    }
    state.pos = pos + len;
    true
}

fn entity_re() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"(?i)^&(?:#x[a-f0-9]{1,6}|#[0-9]{1,7}|[a-z][a-z0-9]{1,31});")
            .expect("Invalid entity regex")
    })
}

/// Named and numeric character references, decoded into pending text.
pub fn entity(state: &mut InlineState<'_>, silent: bool) -> bool {
    let pos = state.pos;
    if state.byte(pos) != b'&' || pos + 1 >= state.pos_max {
        return false;
    }
    let src = state.src;
    let Some(found) = entity_re().find(&src[pos..state.pos_max]) else {
        return false;
    };
    let decoded = html_escape::decode_html_entities(found.as_str());
    if decoded == found.as_str() {
        return false;
    }
    if !silent {
        if decoded.contains('\0') {
            state.pending.push('\u{FFFD}');
        } else {
            state.pending.push_str(&decoded);
        }
    }
    state.pos = pos + found.end();
    true
}

/// Merges adjacent `text` tokens and recomputes levels after post
/// processing turned placeholders into tags.
pub fn fragments_join(state: &mut InlineState<'_>) {
    let tokens = std::mem::take(&mut *state.tokens);
    let mut joined: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut level = 0usize;
    for mut token in tokens {
        if token.nesting == Nesting::Close {
            level = level.saturating_sub(1);
        }
        token.level = level;
        if token.nesting == Nesting::Open {
            level += 1;
        }
        match joined.last_mut() {
            Some(prev) if prev.is("text") && token.is("text") => prev.content.push_str(&token.content),
            _ => joined.push(token),
        }
    }
    *state.tokens = joined;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::Engine;

    fn render(src: &str) -> String {
        Engine::default().render(src).unwrap()
    }

    #[rstest]
    #[case("a\nb", "<p>a\nb</p>\n")]
    #[case("a  \nb", "<p>a<br>\nb</p>\n")]
    #[case("a\\\nb", "<p>a<br>\nb</p>\n")]
    #[case("\\*not em\\*", "<p>*not em*</p>\n")]
    #[case("\\a", "<p>\\a</p>\n")]
    #[case("&copy; &amp; &#x41; &bogus;", "<p>© &amp; A &amp;bogus;</p>\n")]
    fn text_level_rules(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(render(src), expected);
    }

    #[test]
    fn adjacent_text_is_joined() {
        let md = Engine::default();
        let mut tokens = Vec::new();
        md.inline.parse("a\\*b", &md, &mut tokens);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, "a*b");
    }
}
