use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::inline::state::{InlineState, is_space};
use crate::token::{Nesting, Token};

/// Scheme filter for link targets.
pub struct LinkTarget;

impl LinkTarget {
    const BAD_SCHEMES: [&'static str; 4] = ["vbscript:", "javascript:", "file:", "data:"];
    const SAFE_DATA: [&'static str; 4] = [
        "data:image/gif;",
        "data:image/png;",
        "data:image/jpeg;",
        "data:image/webp;",
    ];

    pub fn is_allowed(url: &str) -> bool {
        let url = url.trim().to_lowercase();
        if Self::BAD_SCHEMES.iter().any(|s| url.starts_with(s)) {
            return Self::SAFE_DATA.iter().any(|s| url.starts_with(s));
        }
        true
    }
}

fn unescape_re() -> &'static Regex {
    static UNESCAPE: OnceLock<Regex> = OnceLock::new();
    UNESCAPE.get_or_init(|| {
        Regex::new(r##"\\([!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~])"##).expect("Invalid unescape regex")
    })
}

/// Resolves backslash escapes and character references.
pub fn unescape_all(s: &str) -> String {
    if !s.contains(['\\', '&']) {
        return s.to_string();
    }
    let unescaped = unescape_re().replace_all(s, "$1");
    html_escape::decode_html_entities(&unescaped).into_owned()
}

/// Finds the `]` closing the label opened at `start`. Returns its byte
/// offset and leaves `state.pos` untouched.
pub fn parse_label(state: &mut InlineState<'_>, start: usize, disable_nested: bool) -> Option<usize> {
    let old_pos = state.pos;
    let max = state.pos_max;
    let md = state.md;
    state.pos = start + 1;
    let mut level = 1;
    let mut found = false;

    while state.pos < max {
        let marker = state.byte(state.pos);
        if marker == b']' {
            level -= 1;
            if level == 0 {
                found = true;
                break;
            }
        }
        let prev_pos = state.pos;
        md.inline.skip_token(state);
        if marker == b'[' {
            if prev_pos + 1 == state.pos {
                // a bare `[`, not part of another construct
                level += 1;
            } else if disable_nested {
                state.pos = old_pos;
                return None;
            }
        }
    }

    let end = found.then_some(state.pos);
    state.pos = old_pos;
    end
}

/// Parses `<dest>` or a bare destination with balanced parentheses.
/// Returns the unescaped destination and the position after it.
pub fn parse_destination(src: &str, start: usize, max: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut pos = start;
    if bytes.get(pos) == Some(&b'<') {
        pos += 1;
        while pos < max {
            match bytes[pos] {
                b'\n' | b'<' => return None,
                b'>' => return Some((unescape_all(&src[start + 1..pos]), pos + 1)),
                b'\\' if pos + 1 < max => pos += 2,
                _ => pos += 1,
            }
        }
        return None;
    }

    let mut level = 0;
    while pos < max {
        let ch = bytes[pos];
        if ch == b' ' || ch < 0x20 || ch == 0x7f {
            break;
        }
        if ch == b'\\' && pos + 1 < max {
            if bytes[pos + 1] == b' ' {
                break;
            }
            pos += 2;
            continue;
        }
        if ch == b'(' {
            level += 1;
            if level > 32 {
                return None;
            }
        }
        if ch == b')' {
            if level == 0 {
                break;
            }
            level -= 1;
        }
        pos += 1;
    }
    let pos = pos.min(max);
    if pos == start || level != 0 || !src.is_char_boundary(pos) {
        return None;
    }
    Some((unescape_all(&src[start..pos]), pos))
}

/// Parses a `"title"`, `'title'` or `(title)`.
pub fn parse_title(src: &str, start: usize, max: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut pos = start;
    if pos >= max {
        return None;
    }
    let close = match bytes[pos] {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    pos += 1;
    while pos < max {
        let ch = bytes[pos];
        if ch == close {
            return Some((unescape_all(&src[start + 1..pos]), pos + 1));
        }
        if ch == b'(' && close == b')' {
            return None;
        }
        if ch == b'\\' && pos + 1 < max {
            pos += 1;
        }
        pos += 1;
    }
    None
}

fn skip_whitespace(state: &InlineState<'_>, mut pos: usize, max: usize) -> usize {
    while pos < max && (is_space(state.byte(pos)) || state.byte(pos) == b'\n') {
        pos += 1;
    }
    pos
}

/// The `(dest "title")` tail of an inline link or image, starting at the
/// `(`. Returns href, title and the position after `)`.
fn parse_tail(state: &InlineState<'_>, open_paren: usize) -> Option<(String, String, usize)> {
    let max = state.pos_max;
    let mut pos = skip_whitespace(state, open_paren + 1, max);
    if pos >= max {
        return None;
    }

    let mut href = String::new();
    let mut title = String::new();
    if let Some((dest, after)) = parse_destination(state.src, pos, max) {
        if LinkTarget::is_allowed(&dest) {
            href = dest;
            pos = after;
        }
        let before_title = pos;
        pos = skip_whitespace(state, pos, max);
        if pos < max && pos != before_title {
            if let Some((parsed, after)) = parse_title(state.src, pos, max) {
                title = parsed;
                pos = skip_whitespace(state, after, max);
            }
        }
    }

    if pos >= max || state.byte(pos) != b')' {
        return None;
    }
    Some((href, title, pos + 1))
}

/// Inline link `[label](dest "title")`. The label is tokenized in place
/// between `link_open` and `link_close`. Reference links are not resolved.
pub fn link(state: &mut InlineState<'_>, silent: bool) -> bool {
    if state.byte(state.pos) != b'[' {
        return false;
    }
    let max = state.pos_max;
    let start = state.pos;
    let label_start = start + 1;
    let Some(label_end) = parse_label(state, start, true) else {
        return false;
    };
    let after_label = label_end + 1;
    if after_label >= max || state.byte(after_label) != b'(' {
        return false;
    }
    let Some((href, title, end)) = parse_tail(state, after_label) else {
        return false;
    };

    if !silent {
        state.pos = label_start;
        state.pos_max = label_end;
        let open = state.push("link_open", "a", Nesting::Open);
        open.attr_set("href", href);
        if !title.is_empty() {
            open.attr_set("title", title);
        }
        state.link_level += 1;
        let md = state.md;
        md.inline.tokenize(state);
        state.link_level -= 1;
        state.push("link_close", "a", Nesting::Close);
    }
    state.pos = end;
    state.pos_max = max;
    true
}

/// Inline image `![alt](src "title")`; the alt text is parsed into the
/// token's children and flattened to text at render time.
pub fn image(state: &mut InlineState<'_>, silent: bool) -> bool {
    if state.byte(state.pos) != b'!' || state.byte(state.pos + 1) != b'[' {
        return false;
    }
    let start = state.pos;
    let label_start = start + 2;
    let Some(label_end) = parse_label(state, start + 1, false) else {
        return false;
    };
    let after_label = label_end + 1;
    if after_label >= state.pos_max || state.byte(after_label) != b'(' {
        return false;
    }
    let Some((href, title, end)) = parse_tail(state, after_label) else {
        return false;
    };

    if !silent {
        let content = state.src[label_start..label_end].to_string();
        let md = state.md;
        let mut children: Vec<Token> = Vec::new();
        md.inline.parse(&content, md, &mut children);
        let token = state.push("image", "img", Nesting::SelfClosing);
        token.attr_set("src", href);
        token.attr_set("alt", "");
        if !title.is_empty() {
            token.attr_set("title", title);
        }
        token.children = children;
        token.content = content;
    }
    state.pos = end;
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::Engine;

    #[rstest]
    #[case("[a](http://x.ir)", "<p><a href=\"http://x.ir\">a</a></p>\n")]
    #[case("[a *b*](/p \"T\")", "<p><a href=\"/p\" title=\"T\">a <em>b</em></a></p>\n")]
    #[case("[a](<with space>)", "<p><a href=\"with space\">a</a></p>\n")]
    #[case("[a](javascript:alert(1))", "<p>[a](javascript:alert(1))</p>\n")]
    #[case("[a](/x\\#y \"q\\\"t\")", "<p><a href=\"/x#y\" title=\"q&quot;t\">a</a></p>\n")]
    #[case("[ref]", "<p>[ref]</p>\n")]
    #[case("[a](", "<p>[a](</p>\n")]
    #[case("![الف *ب*](/i.png)", "<p><img src=\"/i.png\" alt=\"الف ب\"></p>\n")]
    fn links(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(Engine::default().render(src).unwrap(), expected);
    }

    #[rstest]
    #[case("javascript:alert(1)", false)]
    #[case(" JAVASCRIPT:x", false)]
    #[case("data:image/png;base64,AAAA", true)]
    #[case("data:text/html,x", false)]
    #[case("https://example.com", true)]
    fn target_filter(#[case] url: &str, #[case] allowed: bool) {
        assert_eq!(LinkTarget::is_allowed(url), allowed);
    }

    #[test]
    fn destination_balances_parentheses() {
        assert_eq!(
            parse_destination("a(b)c) rest", 0, 11),
            Some(("a(b)c".to_string(), 5))
        );
        assert_eq!(parse_destination("a(b", 0, 3), None);
    }
}
