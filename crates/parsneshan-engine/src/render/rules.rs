//! Render rules for token kinds whose HTML is not a plain tag.

use crate::engine::EngineOptions;
use crate::parsing::inline::kinds::link::unescape_all;
use crate::render::{Renderer, escape_html};
use crate::token::Token;

fn line_break(options: &EngineOptions) -> &'static str {
    if options.xhtml_out { "<br />\n" } else { "<br>\n" }
}

pub fn code_inline(tokens: &[Token], idx: usize, _: &EngineOptions, _: &Renderer) -> String {
    let token = &tokens[idx];
    format!(
        "<code{}>{}</code>",
        Renderer::render_attrs(token),
        escape_html(&token.content)
    )
}

pub fn code_block(tokens: &[Token], idx: usize, _: &EngineOptions, _: &Renderer) -> String {
    let token = &tokens[idx];
    format!(
        "<pre{}><code>{}</code></pre>\n",
        Renderer::render_attrs(token),
        escape_html(&token.content)
    )
}

/// Fenced code; the first word of the info string becomes a
/// `language-*` class.
pub fn fence(tokens: &[Token], idx: usize, options: &EngineOptions, _: &Renderer) -> String {
    let token = &tokens[idx];
    let info = unescape_all(&token.info);
    let lang = info.split_whitespace().next().unwrap_or_default();
    let body = escape_html(&token.content);

    if lang.is_empty() {
        return format!("<pre><code{}>{body}</code></pre>\n", Renderer::render_attrs(token));
    }
    let mut annotated = token.clone();
    annotated.attr_join("class", &format!("{}{lang}", options.lang_prefix));
    format!("<pre><code{}>{body}</code></pre>\n", Renderer::render_attrs(&annotated))
}

/// `<img>` with `alt` flattened from the parsed label.
pub fn image(tokens: &[Token], idx: usize, options: &EngineOptions, _: &Renderer) -> String {
    let mut token = tokens[idx].clone();
    token.attr_set("alt", Renderer::render_inline_as_text(&token.children));
    let close = if options.xhtml_out { " />" } else { ">" };
    format!("<img{}{close}", Renderer::render_attrs(&token))
}

pub fn hardbreak(_: &[Token], _: usize, options: &EngineOptions, _: &Renderer) -> String {
    line_break(options).to_string()
}

pub fn softbreak(_: &[Token], _: usize, options: &EngineOptions, _: &Renderer) -> String {
    if options.breaks {
        line_break(options).to_string()
    } else {
        "\n".to_string()
    }
}

pub fn text(tokens: &[Token], idx: usize, _: &EngineOptions, _: &Renderer) -> String {
    escape_html(&tokens[idx].content)
}

/// `html_block` and `html_inline` pass through untouched.
pub fn raw(tokens: &[Token], idx: usize, _: &EngineOptions, _: &Renderer) -> String {
    tokens[idx].content.clone()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Engine, EngineOptions};

    #[rstest]
    #[case("```rust\nfn a() {}\n```", "<pre><code class=\"language-rust\">fn a() {}\n</code></pre>\n")]
    #[case("```\n<b>\n```", "<pre><code>&lt;b&gt;\n</code></pre>\n")]
    #[case("    indented", "<pre><code>indented\n</code></pre>\n")]
    #[case("`a < b`", "<p><code>a &lt; b</code></p>\n")]
    #[case("a\nb", "<p>a\nb</p>\n")]
    fn builtin_rules(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(Engine::default().render(src).unwrap(), expected);
    }

    #[test]
    fn lang_prefix_is_configurable() {
        let md = Engine::new(EngineOptions {
            lang_prefix: "lang-".to_string(),
            ..EngineOptions::default()
        });
        assert_eq!(
            md.render("~~~ py extra\nx\n~~~").unwrap(),
            "<pre><code class=\"lang-py\">x\n</code></pre>\n"
        );
    }

    #[test]
    fn image_in_xhtml_mode() {
        let md = Engine::new(EngineOptions {
            xhtml_out: true,
            ..EngineOptions::default()
        });
        assert_eq!(
            md.render("![a](b.png \"t\")").unwrap(),
            "<p><img src=\"b.png\" alt=\"a\" title=\"t\" /></p>\n"
        );
    }
}
