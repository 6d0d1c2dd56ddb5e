use std::borrow::Cow;

use crate::error::EngineError;

/// Nesting delta of a token: `Open` is +1, `Close` is -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    SelfClosing,
    Close,
}

impl Nesting {
    pub fn delta(self) -> i32 {
        match self {
            Nesting::Open => 1,
            Nesting::SelfClosing => 0,
            Nesting::Close => -1,
        }
    }
}

/// One entry of the flat token stream.
///
/// Block rules produce `*_open` / `*_close` pairs around `inline` tokens;
/// the inline pass fills `children` of every `inline` token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Semantic kind, e.g. `paragraph_open`, `inline`, `text`.
    pub kind: Cow<'static, str>,
    /// Target HTML element, empty for text-like tokens.
    pub tag: Cow<'static, str>,
    pub nesting: Nesting,
    /// Ordered attributes; keys are unique within a token.
    pub attrs: Vec<(String, String)>,
    /// Source line range `[start, end)` for block tokens.
    pub map: Option<(usize, usize)>,
    pub level: usize,
    pub children: Vec<Token>,
    pub content: String,
    /// Source markup that produced the token (`*`, `==`, a fence marker...).
    pub markup: String,
    /// Extra data: fence info string, ordered list item number.
    pub info: String,
    pub block: bool,
    /// Skipped by the renderer (paragraphs inside tight lists).
    pub hidden: bool,
}

impl Token {
    pub fn new(
        kind: impl Into<Cow<'static, str>>,
        tag: impl Into<Cow<'static, str>>,
        nesting: Nesting,
    ) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            attrs: Vec::new(),
            map: None,
            level: 0,
            children: Vec::new(),
            content: String::new(),
            markup: String::new(),
            info: String::new(),
            block: false,
            hidden: false,
        }
    }

    /// Shorthand for a self-closing `text` token.
    pub fn text(content: impl Into<String>) -> Self {
        let mut token = Self::new("text", "", Nesting::SelfClosing);
        token.content = content.into();
        token
    }

    /// Shorthand for a raw `html_inline` fragment.
    pub fn html_inline(content: impl Into<String>) -> Self {
        let mut token = Self::new("html_inline", "", Nesting::SelfClosing);
        token.content = content.into();
        token
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn attr_get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `name`, replacing an existing value in place.
    pub fn attr_set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Appends `value` to an existing attribute, space separated.
    pub fn attr_join(&mut self, name: impl Into<String>, value: &str) {
        let name = name.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => {
                slot.1.push(' ');
                slot.1.push_str(value);
            }
            None => self.attrs.push((name, value.to_string())),
        }
    }
}

/// Verifies that `tokens` (and every token's children) form a well-formed
/// forest: each close matches the innermost open tag and nothing stays open.
pub fn check_nesting(tokens: &[Token]) -> Result<(), EngineError> {
    let mut open: Vec<&str> = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        match token.nesting {
            Nesting::Open => open.push(&token.tag),
            Nesting::Close => match open.pop() {
                Some(expected) if expected == token.tag => {}
                Some(expected) => {
                    return Err(EngineError::MismatchedClose {
                        index,
                        kind: token.kind.to_string(),
                        expected: expected.to_string(),
                        found: token.tag.to_string(),
                    });
                }
                None => {
                    return Err(EngineError::UnopenedClose {
                        index,
                        kind: token.kind.to_string(),
                    });
                }
            },
            Nesting::SelfClosing => {}
        }
        if !token.children.is_empty() {
            check_nesting(&token.children)?;
        }
    }
    match open.last() {
        Some(tag) => Err(EngineError::Unclosed {
            count: open.len(),
            tag: tag.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(tag: &'static str) -> Token {
        Token::new("x_open", tag, Nesting::Open)
    }

    fn close(tag: &'static str) -> Token {
        Token::new("x_close", tag, Nesting::Close)
    }

    #[test]
    fn attr_set_replaces_in_place() {
        let mut token = open("p");
        token.attr_set("class", "a");
        token.attr_set("dir", "rtl");
        token.attr_set("class", "b");
        assert_eq!(
            token.attrs,
            vec![
                ("class".to_string(), "b".to_string()),
                ("dir".to_string(), "rtl".to_string())
            ]
        );
    }

    #[test]
    fn attr_join_appends() {
        let mut token = open("div");
        token.attr_join("class", "admonition");
        token.attr_join("class", "note");
        assert_eq!(token.attr_get("class"), Some("admonition note"));
    }

    #[test]
    fn balanced_stream_passes() {
        let tokens = vec![open("div"), open("p"), Token::text("x"), close("p"), close("div")];
        assert_eq!(check_nesting(&tokens), Ok(()));
    }

    #[test]
    fn stray_close_is_reported() {
        let tokens = vec![close("p")];
        assert!(matches!(
            check_nesting(&tokens),
            Err(EngineError::UnopenedClose { index: 0, .. })
        ));
    }

    #[test]
    fn crossed_tags_are_reported() {
        let tokens = vec![open("strong"), open("em"), close("strong"), close("em")];
        assert!(matches!(
            check_nesting(&tokens),
            Err(EngineError::MismatchedClose { index: 2, .. })
        ));
    }

    #[test]
    fn unclosed_children_are_reported() {
        let mut inline = Token::new("inline", "", Nesting::SelfClosing);
        inline.children = vec![open("mark"), Token::text("x")];
        let tokens = vec![open("p"), inline, close("p")];
        assert!(matches!(
            check_nesting(&tokens),
            Err(EngineError::Unclosed { count: 1, .. })
        ));
    }
}
