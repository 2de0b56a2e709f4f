//! Settings blueprint command.

use serde_json::{Value, json};

use mediahub_core::error::AppError;

use super::Host;
use crate::output;

/// The blueprint together with where the generated form reads and posts.
pub async fn settings_document(host: &Host) -> Result<Value, AppError> {
    let settings = host.avif.settings();
    let blueprint = settings
        .blueprint()
        .await
        .ok_or_else(|| AppError::plugin("AVIF plugin did not register a settings blueprint"))?;

    Ok(json!({
        "plugin": settings.slug(),
        "settings_group": settings.settings_group(),
        "option_name": settings.option_name(),
        "sections": blueprint,
    }))
}

/// Execute the settings command
pub async fn execute(host: &Host) -> Result<(), AppError> {
    output::print_json(&settings_document(host).await?);
    Ok(())
}
