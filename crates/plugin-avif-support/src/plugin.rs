//! AVIF support plugin: wires the settings lifecycle and codec into hooks.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use mediahub_core::result::AppResult;
use mediahub_core::traits::codec::ImageCodec;
use mediahub_core::traits::option_store::OptionStore;
use mediahub_plugin::hooks::definitions::HookPoint;
use mediahub_plugin::hooks::registry::HookHandler;
use mediahub_plugin::plugin_info;
use mediahub_plugin::registry::{Plugin, PluginInfo};
use mediahub_plugin::settings::SettingsLifecycle;

use crate::hooks::{HandleUploadHook, InitHook, UploadMimesHook};
use crate::options::AvifOptions;

/// Plugin identifier and option slug.
pub const SLUG: &str = "avif-support";
/// Settings group the generated form posts to.
pub const SETTINGS_GROUP: &str = "avif_support_settings_group";
/// Capability name of the sibling WebP plugin.
pub const WEBP_CAPABILITY: &str = "webp-support";

/// The AVIF support plugin.
#[derive(Debug)]
pub struct AvifSupportPlugin {
    /// Option access and blueprint holder.
    settings: Arc<SettingsLifecycle>,
    /// Codec used for conversions.
    codec: Arc<dyn ImageCodec>,
}

impl AvifSupportPlugin {
    /// Creates the plugin over an option store and codec.
    pub fn new(store: Arc<dyn OptionStore>, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            settings: Arc::new(SettingsLifecycle::new(SLUG, SETTINGS_GROUP, store)),
            codec,
        }
    }

    /// The plugin's settings lifecycle.
    pub fn settings(&self) -> &Arc<SettingsLifecycle> {
        &self.settings
    }

    /// Reads the current options.
    pub async fn options(&self) -> AppResult<AvifOptions> {
        Ok(AvifOptions::load(&self.settings).await?)
    }
}

#[async_trait]
impl Plugin for AvifSupportPlugin {
    fn info(&self) -> PluginInfo {
        plugin_info!(
            id: SLUG,
            name: "AVIF Support",
            version: env!("CARGO_PKG_VERSION"),
            description: "Allows AVIF uploads and optionally re-encodes or converts them to WebP",
            author: "MediaHub Team"
        )
    }

    async fn on_activate(&self) -> AppResult<()> {
        let written = self
            .settings
            .activate_defaults(AvifOptions::activation_defaults())
            .await?;
        info!(
            plugin_id = SLUG,
            option = %self.settings.option_name(),
            written,
            "AVIF support activated"
        );
        Ok(())
    }

    fn hook_handlers(&self) -> Vec<(HookPoint, Arc<dyn HookHandler>)> {
        vec![
            (
                HookPoint::Init,
                Arc::new(InitHook::new(self.settings.clone())) as Arc<dyn HookHandler>,
            ),
            (
                HookPoint::UploadMimes,
                Arc::new(UploadMimesHook::new(self.settings.clone())) as Arc<dyn HookHandler>,
            ),
            (
                HookPoint::HandleUpload,
                Arc::new(HandleUploadHook::new(
                    self.settings.clone(),
                    self.codec.clone(),
                )) as Arc<dyn HookHandler>,
            ),
        ]
    }
}
