use std::fmt;
use std::sync::Arc;

use parsneshan_engine::Engine;

use crate::error::PluginError;

/// An extension that registers rules into an [`Engine`].
///
/// Implementations must be `Send + Sync`; the configured engine is shared
/// across threads.
pub trait Plugin: Send + Sync {
    /// Unique name, used in logs and errors.
    fn name(&self) -> &str;

    /// Registers the plugin's rules. `options` is the table given with a
    /// [`PluginSpec::Configured`], if any.
    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError>;
}

/// One entry of [`crate::Options::plugins`]: a plugin, optionally with an
/// options table.
#[derive(Clone)]
pub enum PluginSpec {
    Bare(Arc<dyn Plugin>),
    Configured(Arc<dyn Plugin>, toml::Table),
}

impl PluginSpec {
    pub fn bare(plugin: impl Plugin + 'static) -> Self {
        PluginSpec::Bare(Arc::new(plugin))
    }

    pub fn configured(plugin: impl Plugin + 'static, options: toml::Table) -> Self {
        PluginSpec::Configured(Arc::new(plugin), options)
    }

    pub fn plugin(&self) -> &dyn Plugin {
        match self {
            PluginSpec::Bare(plugin) | PluginSpec::Configured(plugin, _) => plugin.as_ref(),
        }
    }

    pub fn options(&self) -> Option<&toml::Table> {
        match self {
            PluginSpec::Bare(_) => None,
            PluginSpec::Configured(_, options) => Some(options),
        }
    }

    pub fn apply(&self, md: &mut Engine) -> Result<(), PluginError> {
        let plugin = self.plugin();
        log::debug!("applying plugin `{}`", plugin.name());
        plugin.apply(md, self.options())
    }
}

impl fmt::Debug for PluginSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginSpec::Bare(plugin) => f.debug_tuple("Bare").field(&plugin.name()).finish(),
            PluginSpec::Configured(plugin, options) => f
                .debug_tuple("Configured")
                .field(&plugin.name())
                .field(options)
                .finish(),
        }
    }
}

/// Fails with [`PluginError::InvalidOption`] when a plugin that takes no
/// options was given a non-empty table.
pub(crate) fn no_options(plugin: &str, options: Option<&toml::Table>) -> Result<(), PluginError> {
    match options.and_then(|table| table.keys().next()) {
        Some(key) => Err(PluginError::InvalidOption {
            plugin: plugin.to_string(),
            key: key.clone(),
            reason: "this plugin takes no options".to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Highlight;

    #[test]
    fn configured_spec_exposes_its_table() {
        let mut table = toml::Table::new();
        table.insert("x".to_string(), toml::Value::Integer(1));
        let spec = PluginSpec::configured(Highlight, table);
        assert_eq!(spec.plugin().name(), "highlight");
        assert_eq!(spec.options().map(|t| t.len()), Some(1));
        assert!(format!("{spec:?}").starts_with("Configured(\"highlight\""));
    }

    #[test]
    fn optionless_plugin_rejects_options() {
        let mut table = toml::Table::new();
        table.insert("color".to_string(), toml::Value::String("red".into()));
        let err = PluginSpec::configured(Highlight, table)
            .apply(&mut Engine::default())
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidOption { ref key, .. } if key == "color"));
    }
}
