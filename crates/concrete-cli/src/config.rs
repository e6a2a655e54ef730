//! Project configuration (concrete.toml)
//!
//! Every setting is optional. Command-line flags take precedence over the
//! file.
//!
//! ```toml
//! [generate]
//! implementation = "Fake{{.Interface}}"
//! receiver = "f"
//! same-unit = false
//! write = true
//!
//! [loader]
//! include-tests = true
//! ```

use concrete_engine::request::validate_identifier;
use concrete_engine::NameTemplate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the package directory.
pub const CONFIG_FILE: &str = "concrete.toml";

/// Errors that can occur while reading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generate: GenerateConfig,
    pub loader: LoaderSection,
}

/// `[generate]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct GenerateConfig {
    /// Name template of the concrete type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impl_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub same_unit: bool,
    pub write: bool,
}

/// `[loader]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LoaderSection {
    pub include_tests: bool,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `explicit` if given, else `<dir>/concrete.toml` when it exists,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(template) = &self.generate.implementation {
            NameTemplate::parse(template)
                .map_err(|err| ConfigError::Validation(err.to_string()))?;
        }
        if let Some(receiver) = &self.generate.receiver {
            validate_identifier(receiver)
                .map_err(|err| ConfigError::Validation(format!("receiver: {}", err)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_str(
            r#"
[generate]
implementation = "Fake{{.Interface}}"
impl-package = "temperature"
receiver = "f"
same-unit = true
write = true

[loader]
include-tests = true
"#,
        )
        .unwrap();
        assert_eq!(
            config.generate.implementation.as_deref(),
            Some("Fake{{.Interface}}")
        );
        assert_eq!(config.generate.impl_package.as_deref(), Some("temperature"));
        assert_eq!(config.generate.receiver.as_deref(), Some("f"));
        assert!(config.generate.same_unit);
        assert!(config.generate.write);
        assert!(config.loader.include_tests);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::from_str("[generate]\ntemplate = \"X\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation() {
        let err = Config::from_str("[generate]\nimplementation = \"{{.Name}}\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::from_str("[generate]\nreceiver = \"func\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(CONFIG_FILE), "[loader]\ninclude-tests = true\n").unwrap();
        assert!(Config::discover(None, dir.path()).unwrap().loader.include_tests);

        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            Config::discover(Some(&missing), dir.path()).unwrap_err(),
            ConfigError::Io { .. }
        ));
    }
}
