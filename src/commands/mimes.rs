//! Upload allowlist command.

use serde::Serialize;
use tabled::Tabled;

use mediahub_core::error::AppError;
use mediahub_core::types::MimeMap;
use mediahub_plugin::hooks::definitions::HookPoint;

use super::Host;
use crate::output::{self, OutputFormat};

/// One allowlist entry
#[derive(Debug, Serialize, Tabled)]
struct MimeRow {
    /// File extension
    extension: String,
    /// MIME type
    mime_type: String,
}

/// Runs the `upload_mimes` filter over the host defaults.
pub async fn allowed_mimes(host: &Host) -> Result<MimeMap, AppError> {
    let ctx = host.manager.request_context().await;
    host.manager
        .dispatcher()
        .apply_filter(HookPoint::UploadMimes, &ctx, "mimes", &MimeMap::host_defaults())
        .await
}

/// Execute the mimes command
pub async fn execute(host: &Host, format: OutputFormat) -> Result<(), AppError> {
    let mimes = allowed_mimes(host).await?;
    let rows: Vec<MimeRow> = mimes
        .iter()
        .map(|(extension, mime_type)| MimeRow {
            extension: extension.to_string(),
            mime_type: mime_type.to_string(),
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
