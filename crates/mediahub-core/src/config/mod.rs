//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Every field carries a serde default, so a missing file
//! yields a working configuration.

pub mod logging;
pub mod uploads;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::uploads::{CapabilitiesConfig, OptionsConfig, UploadsConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Option store settings.
    #[serde(default)]
    pub options: OptionsConfig,
    /// Upload directory settings.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Host-advertised capabilities.
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base file at `path` (without extension is fine), an
    /// environment-specific overlay `config/{env}`, and environment
    /// variables prefixed with `MEDIAHUB__`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MEDIAHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse toml");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.options.path, "data/options.json");
        assert!(!config.capabilities.webp_support);
    }

    #[test]
    fn test_partial_sections() {
        let toml_str = r#"
            [logging]
            format = "json"

            [capabilities]
            webp_support = true
        "#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse toml");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert!(config.capabilities.webp_support);
        assert_eq!(config.uploads.directory, "data/uploads");
    }

    #[test]
    fn test_load_missing_files_is_default() {
        let config = AppConfig::load("does/not/exist", "nowhere").expect("load");
        assert_eq!(config.options.path, "data/options.json");
    }
}
