//! Engine configuration.
//!
//! Resolved once at startup and passed into the pipeline; nothing in the
//! library reads the environment while rendering or pricing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::DISPLAY_DECIMALS;
use crate::render::RenderSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}", path = path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_templates_dir() -> PathBuf { PathBuf::from("templates") }
fn default_decimals() -> usize { DISPLAY_DECIMALS }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    #[serde(default = "default_decimals")]
    pub display_decimals: usize,
    #[serde(default)]
    pub render: RenderSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            display_decimals: default_decimals(),
            render: RenderSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_decimals > 8 {
            return Err(ConfigError::Invalid(format!(
                "displayDecimals must be at most 8, got {}",
                self.display_decimals
            )));
        }
        if self.render.signature.date_format.trim().is_empty() {
            return Err(ConfigError::Invalid("signature.dateFormat cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parties::DEFAULT_MANUFACTURER_TAX_NUMBER;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(
            &path,
            r#"{"templatesDir": "contracts", "render": {"fallbackManufacturer": {"name": "Plant 2"}}}"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.templates_dir, PathBuf::from("contracts"));
        assert_eq!(config.display_decimals, 2);
        assert_eq!(config.render.fallback_manufacturer.name, "Plant 2");
        assert_eq!(config.render.fallback_manufacturer.tax_number, DEFAULT_MANUFACTURER_TAX_NUMBER);
        assert_eq!(config.render.signature.customer_heading, "CUSTOMER");
    }

    #[test]
    fn test_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(EngineConfig::load(&bad), Err(ConfigError::Parse { .. })));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{"displayDecimals": 12}"#).unwrap();
        assert!(matches!(EngineConfig::load(&invalid), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_resolve_without_path() {
        assert_eq!(EngineConfig::resolve(None).unwrap(), EngineConfig::default());
    }
}
