use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::html;
use crate::parsing::inline::kinds::link::LinkTarget;
use crate::parsing::inline::state::InlineState;
use crate::token::Nesting;

fn url_re() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]{1,31}:[^<>\x00-\x20]*$").expect("Invalid autolink regex")
    })
}

fn email_re() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~\-]+@[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("Invalid email autolink regex")
    })
}

fn link_tag_re() -> &'static (Regex, Regex) {
    static LINK_TAGS: OnceLock<(Regex, Regex)> = OnceLock::new();
    LINK_TAGS.get_or_init(|| {
        (
            Regex::new(r"(?i)^<a[>\s]").expect("Invalid link open regex"),
            Regex::new(r"(?i)^</a\s*>").expect("Invalid link close regex"),
        )
    })
}

/// `<scheme:...>` and `<user@host>`.
pub fn autolink(state: &mut InlineState<'_>, silent: bool) -> bool {
    let start = state.pos;
    if state.byte(start) != b'<' {
        return false;
    }
    let max = state.pos_max;
    let mut pos = start + 1;
    loop {
        if pos >= max {
            return false;
        }
        match state.byte(pos) {
            b'<' => return false,
            b'>' => break,
            _ => pos += 1,
        }
    }

    let body = &state.src[start + 1..pos];
    let href = if url_re().is_match(body) {
        body.to_string()
    } else if email_re().is_match(body) {
        format!("mailto:{body}")
    } else {
        return false;
    };
    if !LinkTarget::is_allowed(&href) {
        return false;
    }

    if !silent {
        let text = body.to_string();
        let open = state.push("link_open", "a", Nesting::Open);
        open.attr_set("href", href);
        open.markup = "autolink".to_string();
        open.info = "auto".to_string();
        state.push("text", "", Nesting::SelfClosing).content = text;
        let close = state.push("link_close", "a", Nesting::Close);
        close.markup = "autolink".to_string();
        close.info = "auto".to_string();
    }
    state.pos = pos + 1;
    true
}

/// Raw inline HTML, only with the `html` option on.
pub fn html_inline(state: &mut InlineState<'_>, silent: bool) -> bool {
    if !state.md.options.html {
        return false;
    }
    let pos = state.pos;
    let max = state.pos_max;
    if state.byte(pos) != b'<' || pos + 2 >= max {
        return false;
    }
    let second = state.byte(pos + 1);
    if !matches!(second, b'!' | b'?' | b'/') && !second.is_ascii_alphabetic() {
        return false;
    }
    let Some(found) = html::tag_re().find(&state.src[pos..max]) else {
        return false;
    };
    let content = found.as_str().to_string();
    let len = content.len();

    if !silent {
        let (link_open, link_close) = link_tag_re();
        if link_open.is_match(&content) {
            state.link_level += 1;
        } else if link_close.is_match(&content) {
            state.link_level -= 1;
        }
        state.push("html_inline", "", Nesting::SelfClosing).content = content;
    }
    state.pos += len;
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Engine, EngineOptions};

    #[rstest]
    #[case("<https://example.com/a>", "<p><a href=\"https://example.com/a\">https://example.com/a</a></p>\n")]
    #[case("<foo@bar.ir>", "<p><a href=\"mailto:foo@bar.ir\">foo@bar.ir</a></p>\n")]
    #[case("<javascript:alert(1)>", "<p>&lt;javascript:alert(1)&gt;</p>\n")]
    #[case("<not a link>", "<p>&lt;not a link&gt;</p>\n")]
    fn autolinks(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(Engine::default().render(src).unwrap(), expected);
    }

    #[test]
    fn inline_html_passes_through_when_enabled() {
        let md = Engine::new(EngineOptions {
            html: true,
            ..EngineOptions::default()
        });
        assert_eq!(
            md.render("a <span class=\"x\">b</span>").unwrap(),
            "<p>a <span class=\"x\">b</span></p>\n"
        );
    }

    #[test]
    fn inline_html_is_escaped_when_disabled() {
        assert_eq!(
            Engine::default().render("a <b>c</b>").unwrap(),
            "<p>a &lt;b&gt;c&lt;/b&gt;</p>\n"
        );
    }
}
