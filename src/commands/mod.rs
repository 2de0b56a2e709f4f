//! CLI command definitions and dispatch.

pub mod activate;
pub mod mimes;
pub mod options;
pub mod settings;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use mediahub_core::config::AppConfig;
use mediahub_core::error::AppError;
use mediahub_plugin::capability::{CapabilityRegistry, NamedCapability};
use mediahub_plugin::manager::PluginManager;
use mediahub_plugin::store::JsonFileOptionStore;
use plugin_avif_support::{AvifSupportPlugin, RasterCodec, WEBP_CAPABILITY};

use crate::output::OutputFormat;

/// MediaHub: media library host with AVIF upload support
#[derive(Debug, Parser)]
#[command(name = "mediahub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (loads config/{env}.toml when present)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run plugin activation (writes default options if absent)
    Activate,
    /// Print the upload allowlist after plugins have filtered it
    Mimes,
    /// Print the settings blueprint as JSON
    Settings,
    /// Show or change the AVIF plugin options
    Options(options::OptionsArgs),
    /// Simulate uploading a file through the plugin filters
    Upload(upload::UploadArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let host = Host::start(config).await?;

        let result = match &self.command {
            Commands::Activate => activate::execute(&host).await,
            Commands::Mimes => mimes::execute(&host, self.format).await,
            Commands::Settings => settings::execute(&host).await,
            Commands::Options(args) => options::execute(args, &host, self.format).await,
            Commands::Upload(args) => upload::execute(args, &host, self.format).await,
        };

        host.manager.unload_all().await;
        result
    }
}

/// A running plugin host for the duration of one command.
pub struct Host {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Plugin manager with the AVIF plugin loaded.
    pub manager: PluginManager,
    /// Handle on the AVIF plugin.
    pub avif: Arc<AvifSupportPlugin>,
}

impl Host {
    /// Builds the host: option store, capabilities, plugin load, `init`.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(JsonFileOptionStore::new(&config.options.path));

        let capabilities = Arc::new(CapabilityRegistry::new());
        if config.capabilities.webp_support {
            capabilities
                .register(Arc::new(NamedCapability::new(WEBP_CAPABILITY, env!("CARGO_PKG_VERSION"))))
                .await;
        }

        let avif = Arc::new(AvifSupportPlugin::new(store, Arc::new(RasterCodec::new())));
        let manager = PluginManager::new(capabilities);
        manager.load_plugin(avif.clone()).await?;
        manager.init().await?;

        info!(
            options = %config.options.path,
            webp_support = config.capabilities.webp_support,
            "Host started"
        );

        Ok(Self {
            config,
            manager,
            avif,
        })
    }
}

#[cfg(test)]
mod tests {
    use mediahub_core::error::ErrorKind;
    use plugin_avif_support::{AvifOptions, HandlingMode};

    use super::*;

    fn config(dir: &std::path::Path, webp: bool) -> AppConfig {
        let mut config = AppConfig::default();
        config.options.path = dir.join("options.json").display().to_string();
        config.uploads.directory = dir.join("uploads").display().to_string();
        config.capabilities.webp_support = webp;
        config
    }

    #[tokio::test]
    async fn test_activate_and_set_options() {
        let dir = tempfile::tempdir().expect("tempdir");
        let host = Host::start(config(dir.path(), false)).await.expect("start");

        activate::execute(&host).await.expect("activate");
        assert_eq!(host.avif.options().await.expect("options"), AvifOptions::default());

        let set = options::OptionsArgs {
            command: options::OptionsCommand::Set {
                enabled: None,
                mode: Some("convert".to_string()),
                quality: Some(55),
                recompress: None,
            },
        };
        options::execute(&set, &host, OutputFormat::Json)
            .await
            .expect("set");

        let reopened = Host::start(config(dir.path(), false)).await.expect("restart");
        let opts = reopened.avif.options().await.expect("options");
        assert_eq!(opts.handling_mode, HandlingMode::ConvertToPrimary);
        assert_eq!(opts.quality, 55);
    }

    #[tokio::test]
    async fn test_invalid_option_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let host = Host::start(config(dir.path(), false)).await.expect("start");

        for (mode, quality) in [(Some("gif"), None), (None, Some(0)), (None, Some(101))] {
            let set = options::OptionsArgs {
                command: options::OptionsCommand::Set {
                    enabled: None,
                    mode: mode.map(str::to_string),
                    quality,
                    recompress: None,
                },
            };
            let err = options::execute(&set, &host, OutputFormat::Json)
                .await
                .expect_err("invalid");
            assert_eq!(err.kind, ErrorKind::Validation);
        }
        assert!(!host.avif.settings().is_initialized().await.expect("read"));
    }

    #[tokio::test]
    async fn test_upload_of_avif_needs_plugin_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("photo.avif");
        std::fs::write(&source, b"avif bytes").expect("write source");

        let host = Host::start(config(dir.path(), true)).await.expect("start");
        let args = upload::UploadArgs {
            file: source.clone(),
            mime: None,
        };
        upload::execute(&args, &host, OutputFormat::Json)
            .await
            .expect("asis upload");
        assert!(dir.path().join("uploads").join("photo.avif").exists());

        let disable = options::OptionsArgs {
            command: options::OptionsCommand::Set {
                enabled: Some(false),
                mode: None,
                quality: None,
                recompress: None,
            },
        };
        options::execute(&disable, &host, OutputFormat::Json)
            .await
            .expect("disable");

        let err = upload::execute(&args, &host, OutputFormat::Json)
            .await
            .expect_err("avif not permitted");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_upload_never_overwrites_stored_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let uploads = dir.path().join("uploads");
        std::fs::create_dir_all(&uploads).expect("uploads dir");
        let stored = uploads.join("photo.avif");
        std::fs::write(&stored, b"avif bytes").expect("write stored");

        let host = Host::start(config(dir.path(), false)).await.expect("start");
        let args = upload::UploadArgs {
            file: stored.clone(),
            mime: None,
        };
        upload::execute(&args, &host, OutputFormat::Json)
            .await
            .expect("re-upload");

        assert_eq!(std::fs::read(&stored).expect("read original"), b"avif bytes");
        assert_eq!(
            std::fs::read(uploads.join("photo-1.avif")).expect("read copy"),
            b"avif bytes"
        );

        let other = dir.path().join("photo.avif");
        std::fs::write(&other, b"other avif").expect("write other");
        let args = upload::UploadArgs {
            file: other,
            mime: None,
        };
        upload::execute(&args, &host, OutputFormat::Json)
            .await
            .expect("same name upload");

        assert_eq!(std::fs::read(&stored).expect("read original"), b"avif bytes");
        assert_eq!(
            std::fs::read(uploads.join("photo-2.avif")).expect("read second"),
            b"other avif"
        );
    }

    #[tokio::test]
    async fn test_settings_document_names_option_and_group() {
        let dir = tempfile::tempdir().expect("tempdir");
        let host = Host::start(config(dir.path(), true)).await.expect("start");

        let doc = settings::settings_document(&host).await.expect("settings");
        assert_eq!(doc["plugin"], "avif-support");
        assert_eq!(doc["option_name"], "avif-support_options");
        assert_eq!(doc["settings_group"], "avif_support_settings_group");
        assert!(doc["sections"]["config"]["fields"]["handling_mode"]["options"]["webp"].is_string());
    }
}
