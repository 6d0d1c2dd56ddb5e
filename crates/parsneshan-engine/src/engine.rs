use crate::error::EngineError;
use crate::parsing::blocks::BlockParser;
use crate::parsing::core::{CoreParser, CoreState};
use crate::parsing::inline::InlineParser;
use crate::render::Renderer;
use crate::token::{self, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Pass raw HTML blocks and inline tags through unescaped.
    pub html: bool,
    /// Close void elements with ` />`.
    pub xhtml_out: bool,
    /// Render soft line breaks as `<br>`.
    pub breaks: bool,
    /// Class prefix for fence info strings.
    pub lang_prefix: String,
    /// Maximum block/inline nesting depth.
    pub max_nesting: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            html: false,
            xhtml_out: false,
            breaks: false,
            lang_prefix: "language-".to_string(),
            max_nesting: 100,
        }
    }
}

/// A configured parser/renderer: one [`crate::Ruler`] per stage plus the
/// render rule registry. Plugins mutate it before the first render.
pub struct Engine {
    pub options: EngineOptions,
    pub core: CoreParser,
    pub block: BlockParser,
    pub inline: InlineParser,
    pub renderer: Renderer,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            core: CoreParser::new(),
            block: BlockParser::new(),
            inline: InlineParser::new(),
            renderer: Renderer::new(),
        }
    }

    /// Runs every enabled core rule over `src` and returns the token stream.
    pub fn parse(&self, src: &str) -> Vec<Token> {
        let mut state = CoreState::new(src, self);
        self.core.process(&mut state);
        state.tokens
    }

    pub fn render(&self, src: &str) -> Result<String, EngineError> {
        let mut tokens = self.parse(src);
        self.render_tokens(&mut tokens)
    }

    /// Serializes `tokens`, refusing streams that are not well nested.
    pub fn render_tokens(&self, tokens: &mut [Token]) -> Result<String, EngineError> {
        token::check_nesting(tokens)?;
        Ok(self.renderer.render(tokens, &self.options))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::Nesting;

    #[test]
    fn renders_a_paragraph() {
        let md = Engine::default();
        assert_eq!(md.render("hello *world*").unwrap(), "<p>hello <em>world</em></p>\n");
    }

    #[test]
    fn empty_source_renders_nothing() {
        let md = Engine::default();
        assert_eq!(md.render("").unwrap(), "");
        assert!(md.parse("\n\n").is_empty());
    }

    #[test]
    fn unbalanced_stream_is_refused() {
        let md = Engine::default();
        let mut tokens = md.parse("text");
        tokens.push(Token::new("div_close", "div", Nesting::Close));
        assert!(matches!(
            md.render_tokens(&mut tokens),
            Err(EngineError::UnopenedClose { .. })
        ));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
