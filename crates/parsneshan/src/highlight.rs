use std::sync::Arc;

use parsneshan_engine::{Engine, InlineRule, InlineState, Nesting};

use crate::error::PluginError;
use crate::plugin::{Plugin, no_options};

const MARKER: &str = "==";

/// Inline rule `highlight`: `==text==` becomes `<mark>text</mark>`. The
/// inner text is emitted verbatim, without further inline parsing.
pub fn highlight(state: &mut InlineState<'_>, silent: bool) -> bool {
    let start = state.pos;
    let max = state.pos_max;
    let inner = start + MARKER.len();
    if inner > max || !state.src[start..].starts_with(MARKER) {
        return false;
    }
    let Some(offset) = state.src[inner..max].find(MARKER) else {
        return false;
    };
    let close = inner + offset;
    let content = &state.src[inner..close];
    if content.trim().is_empty() {
        return false;
    }

    if !silent {
        let content = content.to_string();
        state.push("mark_open", "mark", Nesting::Open).markup = MARKER.to_string();
        state.push("text", "", Nesting::SelfClosing).content = content;
        state.push("mark_close", "mark", Nesting::Close).markup = MARKER.to_string();
    }
    state.pos = close + MARKER.len();
    true
}

pub struct Highlight;

impl Highlight {
    pub const RULE: &'static str = "highlight";
}

impl Plugin for Highlight {
    fn name(&self) -> &str {
        Self::RULE
    }

    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError> {
        no_options(self.name(), options)?;
        let rule: Arc<dyn InlineRule> = Arc::new(highlight);
        md.inline
            .ruler
            .before("emphasis", Self::RULE, rule)
            .map_err(PluginError::registration(Self::RULE))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn engine() -> Engine {
        let mut md = Engine::default();
        Highlight.apply(&mut md, None).unwrap();
        md
    }

    fn kinds(src: &str) -> Vec<String> {
        let md = engine();
        let mut tokens = Vec::new();
        md.inline.parse(src, &md, &mut tokens);
        tokens.iter().map(|t| t.kind.to_string()).collect()
    }

    #[rstest]
    #[case("a ==b== c", "<p>a <mark>b</mark> c</p>\n")]
    #[case("این یک ==متن مهم== است.", "<p>این یک <mark>متن مهم</mark> است.</p>\n")]
    #[case("==*raw*==", "<p><mark>*raw*</mark></p>\n")]
    #[case("==a== and ==b==", "<p><mark>a</mark> and <mark>b</mark></p>\n")]
    #[case("a ==b", "<p>a ==b</p>\n")]
    #[case("a == ==", "<p>a == ==</p>\n")]
    #[case("====", "<p>====</p>\n")]
    #[case("`==code==`", "<p><code>==code==</code></p>\n")]
    #[case("*em ==mark== em*", "<p><em>em <mark>mark</mark> em</em></p>\n")]
    fn renders(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(engine().render(src).unwrap(), expected);
    }

    #[test]
    fn emits_open_text_close() {
        assert_eq!(kinds("a ==b== c"), vec!["text", "mark_open", "text", "mark_close", "text"]);
    }

    #[test]
    fn markup_is_recorded() {
        let md = engine();
        let mut tokens = Vec::new();
        md.inline.parse("==x==", &md, &mut tokens);
        assert_eq!(tokens[0].markup, "==");
        assert_eq!(tokens[1].content, "x");
        assert_eq!(tokens[2].markup, "==");
    }

    #[test]
    fn silent_mode_only_advances() {
        let md = engine();
        let mut sink = Vec::new();
        let mut state = InlineState::new("==x== tail", &md, &mut sink);
        assert!(highlight(&mut state, true));
        assert_eq!(state.pos, 5);
        drop(state);
        assert!(sink.is_empty());
    }

    #[test]
    fn closer_must_lie_inside_the_window() {
        let md = engine();
        let mut sink = Vec::new();
        let mut state = InlineState::new("==x==", &md, &mut sink);
        state.pos_max = 4;
        assert!(!highlight(&mut state, false));
        assert_eq!(state.pos, 0);
    }

    #[test]
    fn registered_before_emphasis() {
        let md = engine();
        let names = md.inline.ruler.names();
        let highlight = names.iter().position(|n| *n == "highlight").unwrap();
        let emphasis = names.iter().position(|n| *n == "emphasis").unwrap();
        assert_eq!(highlight + 1, emphasis);
    }
}
