//! Upload handling and option-store configuration.

use serde::{Deserialize, Serialize};

/// Where uploaded files live and how they are addressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory the media library copies uploads into.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Public base URL for the upload directory.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            base_url: default_base_url(),
        }
    }
}

/// Persistent option store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Path to the JSON document holding all plugin options.
    #[serde(default = "default_options_path")]
    pub path: String,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            path: default_options_path(),
        }
    }
}

/// Capabilities the host advertises to plugins at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CapabilitiesConfig {
    /// Whether the WebP support component is installed alongside.
    #[serde(default)]
    pub webp_support: bool,
}

fn default_directory() -> String {
    "data/uploads".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080/uploads".to_string()
}

fn default_options_path() -> String {
    "data/options.json".to_string()
}
