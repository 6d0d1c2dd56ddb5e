//! # HTML Rendering
//!
//! [`Renderer`] walks a token stream and concatenates HTML fragments. Each
//! token kind may have a [`RenderRule`]; kinds without one go through
//! [`Renderer::render_token`], which prints the tag with its attributes and
//! decides on trailing newlines.
//!
//! [`RenderStep`]s run before a block token's rule and may only add
//! attributes. They run in registration order.

pub mod rules;

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::EngineOptions;
use crate::token::{Nesting, Token};

pub trait RenderRule: Send + Sync {
    fn render(&self, tokens: &[Token], idx: usize, options: &EngineOptions, renderer: &Renderer) -> String;
}

impl<F> RenderRule for F
where
    F: Fn(&[Token], usize, &EngineOptions, &Renderer) -> String + Send + Sync,
{
    fn render(&self, tokens: &[Token], idx: usize, options: &EngineOptions, renderer: &Renderer) -> String {
        self(tokens, idx, options, renderer)
    }
}

/// Attribute middleware for block tokens.
pub trait RenderStep: Send + Sync {
    fn name(&self) -> &str;

    fn applies_to(&self, kind: &str) -> bool;

    /// Attributes to set on `tokens[idx]` before it renders.
    fn annotate(&self, tokens: &[Token], idx: usize) -> Vec<(String, String)>;
}

/// Escapes `&`, `<`, `>` and `"`.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

pub struct Renderer {
    rules: HashMap<String, Arc<dyn RenderRule>>,
    steps: Vec<Arc<dyn RenderStep>>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut renderer = Self {
            rules: HashMap::new(),
            steps: Vec::new(),
        };
        renderer.set_rule("code_inline", Arc::new(rules::code_inline));
        renderer.set_rule("code_block", Arc::new(rules::code_block));
        renderer.set_rule("fence", Arc::new(rules::fence));
        renderer.set_rule("image", Arc::new(rules::image));
        renderer.set_rule("hardbreak", Arc::new(rules::hardbreak));
        renderer.set_rule("softbreak", Arc::new(rules::softbreak));
        renderer.set_rule("text", Arc::new(rules::text));
        renderer.set_rule("html_block", Arc::new(rules::raw));
        renderer.set_rule("html_inline", Arc::new(rules::raw));
        renderer
    }

    /// Installs (or replaces) the rule for `kind`.
    pub fn set_rule(&mut self, kind: impl Into<String>, rule: Arc<dyn RenderRule>) {
        self.rules.insert(kind.into(), rule);
    }

    pub fn rule(&self, kind: &str) -> Option<&Arc<dyn RenderRule>> {
        self.rules.get(kind)
    }

    pub fn push_step(&mut self, step: Arc<dyn RenderStep>) {
        log::debug!("render step `{}` registered", step.name());
        self.steps.push(step);
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Renders a block-level stream. Steps annotate tokens in place, so the
    /// stream carries the final attributes afterwards.
    pub fn render(&self, tokens: &mut [Token], options: &EngineOptions) -> String {
        let mut out = String::new();
        for idx in 0..tokens.len() {
            for step in &self.steps {
                if !step.applies_to(&tokens[idx].kind) {
                    continue;
                }
                for (name, value) in step.annotate(tokens, idx) {
                    tokens[idx].attr_set(name, value);
                }
            }

            let token = &tokens[idx];
            if token.is("inline") {
                out.push_str(&self.render_inline(&token.children, options));
            } else {
                out.push_str(&self.render_one(tokens, idx, options));
            }
        }
        out
    }

    pub fn render_inline(&self, tokens: &[Token], options: &EngineOptions) -> String {
        (0..tokens.len())
            .map(|idx| self.render_one(tokens, idx, options))
            .collect()
    }

    fn render_one(&self, tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
        match self.rules.get(tokens[idx].kind.as_ref()) {
            Some(rule) => rule.render(tokens, idx, options, self),
            None => self.render_token(tokens, idx, options),
        }
    }

    /// Default rendering: `<tag attrs>` / `</tag>`, with a newline after
    /// block tags unless an inline token or the matching close follows.
    pub fn render_token(&self, tokens: &[Token], idx: usize, options: &EngineOptions) -> String {
        let token = &tokens[idx];
        if token.hidden {
            return String::new();
        }

        let mut out = String::new();
        // a hidden paragraph leaves no newline behind
        if token.block && token.nesting != Nesting::Close && idx > 0 && tokens[idx - 1].hidden {
            out.push('\n');
        }
        out.push_str(if token.nesting == Nesting::Close { "</" } else { "<" });
        out.push_str(&token.tag);
        out.push_str(&Self::render_attrs(token));
        if token.nesting == Nesting::SelfClosing && options.xhtml_out {
            out.push_str(" /");
        }

        let mut need_lf = token.block;
        if token.block
            && token.nesting == Nesting::Open
            && let Some(next) = tokens.get(idx + 1)
            && (next.is("inline") || next.hidden || (next.nesting == Nesting::Close && next.tag == token.tag))
        {
            need_lf = false;
        }
        out.push_str(if need_lf { ">\n" } else { ">" });
        out
    }

    pub fn render_attrs(token: &Token) -> String {
        token
            .attrs
            .iter()
            .map(|(name, value)| format!(" {}=\"{}\"", escape_html(name), escape_html(value)))
            .collect()
    }

    /// Plain text of inline tokens, for `alt` attributes.
    pub fn render_inline_as_text(tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            match token.kind.as_ref() {
                "text" | "html_inline" | "html_block" => out.push_str(&token.content),
                "image" => out.push_str(&Self::render_inline_as_text(&token.children)),
                "softbreak" | "hardbreak" => out.push('\n'),
                _ => {}
            }
        }
        out
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
