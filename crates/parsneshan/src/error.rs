use parsneshan_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmonitionTableError {
    #[error("admonition keyword is empty")]
    EmptyKeyword,

    #[error("admonition `{keyword}` has an empty class")]
    EmptyClass { keyword: String },

    #[error("admonition keyword `{0}` is listed twice")]
    DuplicateKeyword(String),
}

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin `{plugin}` could not register its rules: {source}")]
    Registration {
        plugin: String,
        source: EngineError,
    },

    #[error("plugin `{plugin}` rejected option `{key}`: {reason}")]
    InvalidOption {
        plugin: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    AdmonitionTable(#[from] AdmonitionTableError),
}

impl PluginError {
    pub(crate) fn registration(plugin: &str) -> impl FnOnce(EngineError) -> Self + '_ {
        move |source| PluginError::Registration {
            plugin: plugin.to_string(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid admonition table: {0}")]
    AdmonitionTable(#[from] AdmonitionTableError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Config(#[from] parsneshan_config::ConfigError),
}
