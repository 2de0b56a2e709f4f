//! Hook handlers registered by the AVIF plugin.

use std::sync::Arc;

use tracing::debug;

use mediahub_core::traits::codec::ImageCodec;
use mediahub_core::types::{MimeMap, UploadDescriptor};
use mediahub_plugin::prelude::*;

use crate::error::AvifError;
use crate::options::AvifOptions;
use crate::plugin::{SLUG, WEBP_CAPABILITY};
use crate::settings::build_blueprint;
use crate::{mime, policy};

/// Payload key of the `upload_mimes` filter.
pub const MIMES_KEY: &str = "mimes";
/// Payload key of the `handle_upload` filter.
pub const UPLOAD_KEY: &str = "upload";

/// `init`: publishes the settings blueprint.
#[derive(Debug)]
pub struct InitHook {
    /// Shared settings lifecycle.
    settings: Arc<SettingsLifecycle>,
}

impl InitHook {
    /// Creates the handler.
    pub fn new(settings: Arc<SettingsLifecycle>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl HookHandler for InitHook {
    fn name(&self) -> &str {
        "avif_support_init"
    }

    fn plugin_id(&self) -> &str {
        SLUG
    }

    async fn execute(&self, ctx: &HookContext, _payload: &HookPayload) -> HookResult {
        let webp = ctx.capabilities.is_available(WEBP_CAPABILITY);
        self.settings
            .init_settings_generator(build_blueprint(webp))
            .await;
        Ok(HookAction::Continue(None))
    }
}

/// `upload_mimes`: adds AVIF to the allowlist while enabled.
#[derive(Debug)]
pub struct UploadMimesHook {
    /// Shared settings lifecycle.
    settings: Arc<SettingsLifecycle>,
}

impl UploadMimesHook {
    /// Creates the handler.
    pub fn new(settings: Arc<SettingsLifecycle>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl HookHandler for UploadMimesHook {
    fn name(&self) -> &str {
        "avif_support_upload_mimes"
    }

    fn plugin_id(&self) -> &str {
        SLUG
    }

    async fn execute(&self, _ctx: &HookContext, payload: &HookPayload) -> HookResult {
        let mimes: MimeMap = payload.get_typed(MIMES_KEY)?;
        let options = AvifOptions::load(&self.settings).await?;
        HookAction::replace(MIMES_KEY, &mime::extend(mimes, &options))
    }
}

/// `handle_upload`: keeps, re-encodes or transcodes AVIF uploads.
#[derive(Debug)]
pub struct HandleUploadHook {
    /// Shared settings lifecycle.
    settings: Arc<SettingsLifecycle>,
    /// Codec that performs conversions.
    codec: Arc<dyn ImageCodec>,
}

impl HandleUploadHook {
    /// Creates the handler.
    pub fn new(settings: Arc<SettingsLifecycle>, codec: Arc<dyn ImageCodec>) -> Self {
        Self { settings, codec }
    }
}

#[async_trait]
impl HookHandler for HandleUploadHook {
    fn name(&self) -> &str {
        "avif_support_handle_upload"
    }

    fn plugin_id(&self) -> &str {
        SLUG
    }

    fn priority(&self) -> i32 {
        50
    }

    async fn execute(&self, ctx: &HookContext, payload: &HookPayload) -> HookResult {
        let upload: UploadDescriptor = payload.get_typed(UPLOAD_KEY)?;
        let options = AvifOptions::load(&self.settings).await?;
        let webp = ctx.capabilities.is_available(WEBP_CAPABILITY);

        let result = policy::decide(&upload, &options, webp, self.codec.as_ref())
            .await
            .map_err(AvifError::from)?;

        if result == upload {
            debug!(request_id = %ctx.request_id, "Upload unchanged");
            return Ok(HookAction::Continue(None));
        }
        HookAction::replace(UPLOAD_KEY, &result)
    }
}
