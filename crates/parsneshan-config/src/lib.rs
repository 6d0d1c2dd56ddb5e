use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PARSNESHAN_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Options passed through to the Markdown engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub html: bool,
    pub xhtml_out: bool,
    pub breaks: bool,
    pub lang_prefix: String,
    pub max_nesting: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            html: true,
            xhtml_out: false,
            breaks: false,
            lang_prefix: "language-".to_string(),
            max_nesting: 100,
        }
    }
}

/// One `...keyword` callout type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmonitionConfig {
    pub keyword: String,
    pub class: String,
    /// Display title; the keyword itself when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl AdmonitionConfig {
    pub fn new(keyword: &str, class: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            class: class.to_string(),
            title: None,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.keyword)
    }
}

pub fn default_admonitions() -> Vec<AdmonitionConfig> {
    vec![
        AdmonitionConfig::new("هشدار", "warning"),
        AdmonitionConfig::new("توجه", "note"),
        AdmonitionConfig::new("نکته", "tip"),
        AdmonitionConfig::new("مهم", "important"),
        AdmonitionConfig::new("احتیاط", "caution"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionConfig {
    /// Memoize direction lookups.
    pub cache: bool,
    /// Give this parser a private cache of this size instead of the
    /// process-wide one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            cache: true,
            capacity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub admonitions: Vec<AdmonitionConfig>,
    pub direction: DirectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            admonitions: default_admonitions(),
            direction: DirectionConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    /// `$PARSNESHAN_CONFIG` (shell-expanded) when set, otherwise
    /// `~/.config/parsneshan/config.toml`.
    pub fn config_path() -> PathBuf {
        if let Ok(custom) = std::env::var(CONFIG_ENV)
            && !custom.is_empty()
        {
            let path = PathBuf::from(&custom);
            return Self::expand_path(&path).unwrap_or(path);
        }
        let config_dir = shellexpand::tilde("~/.config/parsneshan");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_default_and_override() {
        unsafe {
            env::remove_var(CONFIG_ENV);
        }
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/parsneshan/config.toml"));

        unsafe {
            env::set_var("PARSNESHAN_TEST_ROOT", "/srv/docs");
            env::set_var(CONFIG_ENV, "$PARSNESHAN_TEST_ROOT/parsneshan.toml");
        }
        assert_eq!(Config::config_path(), PathBuf::from("/srv/docs/parsneshan.toml"));

        unsafe {
            env::remove_var(CONFIG_ENV);
            env::remove_var("PARSNESHAN_TEST_ROOT");
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.engine.html);
        assert_eq!(config.engine.max_nesting, 100);
        assert!(config.direction.cache);
        let keywords: Vec<&str> = config.admonitions.iter().map(|a| a.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["هشدار", "توجه", "نکته", "مهم", "احتیاط"]);
        assert_eq!(config.admonitions[1].class, "note");
        assert_eq!(config.admonitions[1].display_title(), "توجه");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[engine]
breaks = true

[direction]
cache = false
"#,
        )
        .unwrap();

        assert!(config.engine.breaks);
        assert!(config.engine.html);
        assert!(!config.direction.cache);
        assert_eq!(config.admonitions, default_admonitions());
    }

    #[test]
    fn test_custom_admonitions_replace_defaults() {
        let config: Config = toml::from_str(
            r#"
[[admonitions]]
keyword = "مثال"
class = "example"
title = "یک مثال"
"#,
        )
        .unwrap();

        assert_eq!(config.admonitions.len(), 1);
        assert_eq!(config.admonitions[0].display_title(), "یک مثال");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("broken.toml");
        std::fs::write(&config_file, "[engine\nhtml = ").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut test_config = Config::default();
        test_config.engine.xhtml_out = true;
        test_config.direction.capacity = Some(16);

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
