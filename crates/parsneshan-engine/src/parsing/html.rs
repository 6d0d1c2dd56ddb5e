//! Raw HTML recognizers shared by the `html_block` and `html_inline` rules.

use std::sync::OnceLock;

use regex::Regex;

/// Element names that open an HTML block of the "until blank line" kind.
pub(crate) const BLOCK_NAMES: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

const ATTR_NAME: &str = r"[a-zA-Z_:][a-zA-Z0-9:._-]*";
const UNQUOTED: &str = r#"[^"'=<>`\x00-\x20]+"#;
const SINGLE_QUOTED: &str = r"'[^']*'";
const DOUBLE_QUOTED: &str = r#""[^"]*""#;

fn open_tag() -> String {
    let value = format!("(?:{UNQUOTED}|{SINGLE_QUOTED}|{DOUBLE_QUOTED})");
    let attribute = format!(r"(?:\s+{ATTR_NAME}(?:\s*=\s*{value})?)");
    format!(r"<[A-Za-z][A-Za-z0-9\-]*{attribute}*\s*/?>")
}

const CLOSE_TAG: &str = r"</[A-Za-z][A-Za-z0-9\-]*\s*>";
const COMMENT: &str = r"<!---?>|<!--(?:[^-]|-[^-]|--[^>])*-->";
const PROCESSING: &str = r"<[?][\s\S]*?[?]>";
const DECLARATION: &str = r"<![A-Za-z][^>]*>";
const CDATA: &str = r"<!\[CDATA\[[\s\S]*?\]\]>";

/// Any inline HTML construct anchored at the start of the haystack.
pub(crate) fn tag_re() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        let open = open_tag();
        Regex::new(&format!(
            "^(?:{open}|{CLOSE_TAG}|{COMMENT}|{PROCESSING}|{DECLARATION}|{CDATA})"
        ))
        .expect("Invalid HTML tag regex")
    })
}

/// A lone open or close tag filling the rest of the line.
pub(crate) fn open_close_line_re() -> &'static Regex {
    static OPEN_CLOSE: OnceLock<Regex> = OnceLock::new();
    OPEN_CLOSE.get_or_init(|| {
        let open = open_tag();
        Regex::new(&format!(r"^(?:{open}|{CLOSE_TAG})\s*$")).expect("Invalid HTML open/close regex")
    })
}

/// HTML block kinds: start pattern, end pattern, and whether the kind may
/// interrupt a paragraph.
pub(crate) struct HtmlSequence {
    pub start: Regex,
    pub end: Regex,
    pub interrupts: bool,
}

pub(crate) fn sequences() -> &'static [HtmlSequence] {
    static SEQUENCES: OnceLock<Vec<HtmlSequence>> = OnceLock::new();
    SEQUENCES.get_or_init(|| {
        let seq = |start: &str, end: &str, interrupts: bool| HtmlSequence {
            start: Regex::new(start).expect("Invalid HTML block start regex"),
            end: Regex::new(end).expect("Invalid HTML block end regex"),
            interrupts,
        };
        let names = BLOCK_NAMES.join("|");
        vec![
            seq(
                r"(?i)^<(script|pre|style|textarea)(?:\s|>|$)",
                r"(?i)</(script|pre|style|textarea)>",
                true,
            ),
            seq(r"^<!--", r"-->", true),
            seq(r"^<\?", r"\?>", true),
            seq(r"^<![A-Z]", r">", true),
            seq(r"^<!\[CDATA\[", r"\]\]>", true),
            seq(&format!(r"(?i)^</?({names})(?:\s|/?>|$)"), r"^$", true),
            HtmlSequence {
                start: open_close_line_re().clone(),
                end: Regex::new(r"^$").expect("Invalid HTML block end regex"),
                interrupts: false,
            },
        ]
    })
}
