use std::sync::Arc;

use parsneshan_config::{Config, DirectionConfig, EngineConfig};
use parsneshan_engine::EngineOptions;

use crate::admonition::{AdmonitionKind, AdmonitionTable};
use crate::direction::cache::{self, BoundedCache, DirectionCache, NoCache};
use crate::plugin::PluginSpec;

/// Where a parser's direction lookups are memoized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// The process-wide cache.
    #[default]
    Shared,
    /// A cache private to one parser.
    Bounded(usize),
    Disabled,
}

impl CachePolicy {
    pub fn build(self) -> Arc<dyn DirectionCache> {
        match self {
            CachePolicy::Shared => cache::shared(),
            CachePolicy::Bounded(capacity) => Arc::new(BoundedCache::new(capacity)),
            CachePolicy::Disabled => Arc::new(NoCache),
        }
    }
}

impl From<&DirectionConfig> for CachePolicy {
    fn from(config: &DirectionConfig) -> Self {
        match (config.cache, config.capacity) {
            (false, _) => CachePolicy::Disabled,
            (true, Some(capacity)) => CachePolicy::Bounded(capacity),
            (true, None) => CachePolicy::Shared,
        }
    }
}

/// Construction-time settings for [`crate::ParsNeshan`].
#[derive(Debug, Clone)]
pub struct Options {
    pub engine: EngineOptions,
    pub admonitions: AdmonitionTable,
    pub direction_cache: CachePolicy,
    /// Applied in order after the built-in extensions.
    pub plugins: Vec<PluginSpec>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            engine: EngineOptions {
                html: true,
                ..EngineOptions::default()
            },
            admonitions: AdmonitionTable::default(),
            direction_cache: CachePolicy::default(),
            plugins: Vec::new(),
        }
    }
}

impl Options {
    pub fn with_plugin(mut self, plugin: PluginSpec) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            engine: engine_options(&config.engine),
            admonitions: config.admonitions.iter().map(AdmonitionKind::from).collect(),
            direction_cache: CachePolicy::from(&config.direction),
            plugins: Vec::new(),
        }
    }
}

fn engine_options(config: &EngineConfig) -> EngineOptions {
    EngineOptions {
        html: config.html,
        xhtml_out: config.xhtml_out,
        breaks: config.breaks,
        lang_prefix: config.lang_prefix.clone(),
        max_nesting: config.max_nesting,
    }
}

#[cfg(test)]
mod tests {
    use parsneshan_config::AdmonitionConfig;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_allow_html() {
        let options = Options::default();
        assert!(options.engine.html);
        assert_eq!(options.direction_cache, CachePolicy::Shared);
        assert_eq!(options.admonitions, AdmonitionTable::default());
        assert!(options.plugins.is_empty());
    }

    #[test]
    fn default_config_matches_default_options() {
        let options = Options::from_config(&Config::default());
        let defaults = Options::default();
        assert_eq!(options.engine, defaults.engine);
        assert_eq!(options.admonitions, defaults.admonitions);
        assert_eq!(options.direction_cache, defaults.direction_cache);
    }

    #[test]
    fn config_sections_carry_over() {
        let mut config = Config::default();
        config.engine.xhtml_out = true;
        config.engine.lang_prefix = "lang-".to_string();
        config.admonitions = vec![AdmonitionConfig::new("todo", "todo")];

        let options = Options::from_config(&config);
        assert!(options.engine.xhtml_out);
        assert_eq!(options.engine.lang_prefix, "lang-");
        assert_eq!(options.admonitions.kinds(), &[AdmonitionKind::new("todo", "todo", "todo")]);
    }

    #[rstest]
    #[case(true, None, CachePolicy::Shared)]
    #[case(true, Some(8), CachePolicy::Bounded(8))]
    #[case(false, Some(8), CachePolicy::Disabled)]
    #[case(false, None, CachePolicy::Disabled)]
    fn cache_policy_from_config(
        #[case] cache: bool,
        #[case] capacity: Option<usize>,
        #[case] expected: CachePolicy,
    ) {
        let config = DirectionConfig { cache, capacity };
        assert_eq!(CachePolicy::from(&config), expected);
    }

    #[test]
    fn shared_policy_reuses_the_process_cache() {
        assert!(Arc::ptr_eq(&CachePolicy::Shared.build(), &cache::shared()));
        assert!(!Arc::ptr_eq(&CachePolicy::Bounded(4).build(), &cache::shared()));
    }
}
