//! Plugin activation command.

use mediahub_core::error::AppError;
use plugin_avif_support::SLUG;

use super::Host;
use crate::output;

/// Execute the activate command
pub async fn execute(host: &Host) -> Result<(), AppError> {
    let settings = host.avif.settings();
    let existed = settings.is_initialized().await?;

    host.manager.activate(SLUG).await?;

    if existed {
        output::print_warning(&format!(
            "Options '{}' already present, left unchanged",
            settings.option_name()
        ));
    } else {
        output::print_success(&format!(
            "Default options written to '{}'",
            settings.option_name()
        ));
    }
    Ok(())
}
