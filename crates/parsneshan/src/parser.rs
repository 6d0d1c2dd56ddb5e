use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use log::{debug, error, warn};
use parsneshan_config::Config;
use parsneshan_engine::render::escape_html;
use parsneshan_engine::{Engine, EngineError, Token};

use crate::admonition::Admonition;
use crate::checklist::Checklist;
use crate::digits::PersianList;
use crate::direction::AutoDirection;
use crate::error::Error;
use crate::highlight::Highlight;
use crate::options::Options;
use crate::plugin::Plugin;
use crate::poetry::Poetry;

/// An [`Engine`] with every extension registered.
pub struct ParsNeshan {
    md: Engine,
}

impl ParsNeshan {
    pub fn new(options: Options) -> Result<Self, Error> {
        options.admonitions.validate()?;

        let mut md = Engine::new(options.engine);
        let builtin: [&dyn Plugin; 6] = [
            &Highlight,
            &Admonition::new(options.admonitions),
            &Checklist,
            &PersianList,
            &Poetry,
            &AutoDirection::new(options.direction_cache.build()),
        ];
        for plugin in builtin {
            debug!("Applying built-in plugin {}", plugin.name());
            plugin.apply(&mut md, None)?;
        }
        for spec in &options.plugins {
            spec.apply(&mut md)?;
        }
        Ok(Self { md })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(Options::from_config(config))
    }

    /// Builds from the config file at `path`, or from defaults when the
    /// file does not exist.
    pub fn from_config_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config = Config::load_from_path(path)?.unwrap_or_default();
        Self::from_config(&config)
    }

    /// Builds from the user's config file, see [`Config::config_path`].
    pub fn load() -> Result<Self, Error> {
        let config = Config::load()?.unwrap_or_default();
        Self::from_config(&config)
    }

    pub fn engine(&self) -> &Engine {
        &self.md
    }

    pub fn parse(&self, src: &str) -> Vec<Token> {
        self.md.parse(src)
    }

    pub fn try_render(&self, src: &str) -> Result<String, EngineError> {
        self.md.render(src)
    }

    /// Renders `src` to HTML. A fault inside any rule is logged and the
    /// source is returned escaped inside `<pre>`.
    pub fn render(&self, src: &str) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_render(src))) {
            Ok(Ok(html)) => html,
            Ok(Err(err)) => {
                error!("Render failed, falling back to preformatted source: {err}");
                fallback(src)
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Render panicked, falling back to preformatted source: {reason}");
                fallback(src)
            }
        }
    }

    /// Like [`ParsNeshan::render`] for raw bytes; input that is not UTF-8
    /// renders as an empty string.
    pub fn render_bytes(&self, src: &[u8]) -> String {
        match std::str::from_utf8(src) {
            Ok(src) => self.render(src),
            Err(err) => {
                warn!("Ignoring input that is not valid UTF-8: {err}");
                String::new()
            }
        }
    }
}

fn fallback(src: &str) -> String {
    format!("<pre>{}</pre>\n", escape_html(src))
}
