//! # Grove Core Configuration
//!
//! [`HostConfig`] holds the knobs of the addon pipeline: the module extension used
//! by the entry point resolver and the file layout used by directory discovery.
//! It can be read from JSON, YAML (`yaml-config` feature) or TOML (`toml-config`
//! feature); the format follows the file extension.
pub mod error;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;
pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Configuration of the addon pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Extension appended to entry points that have none
    pub module_extension: String,
    /// Manifest file name inside each addon directory
    pub manifest_file: String,
    /// Directory holding nested addons, relative to their owner
    pub nested_dir: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            module_extension: constants::MODULE_EXTENSION.to_string(),
            manifest_file: constants::DEFAULT_MANIFEST_FILE.to_string(),
            nested_dir: constants::DEFAULT_NESTED_DIR.to_string(),
        }
    }
}

impl HostConfig {
    /// Load configuration from `path`, picking the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedConfigFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, format)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| deserialization(format, e))?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| deserialization(format, e))?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| deserialization(format, e))?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let extension = self.module_extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                key: "module_extension".to_string(),
                message: format!("'{}' is not a file extension", self.module_extension),
            });
        }
        if self.manifest_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "manifest_file".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn deserialization<E>(format: ConfigFormat, source: E) -> ConfigError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ConfigError::DeserializationError {
        format: format.extension().to_string(),
        source: Box::new(source),
    }
}
