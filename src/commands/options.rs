//! AVIF plugin option commands.

use clap::{Args, Subcommand};

use mediahub_core::error::AppError;
use plugin_avif_support::HandlingMode;

use super::Host;
use crate::output::{self, OutputFormat};

/// Arguments for options commands
#[derive(Debug, Args)]
pub struct OptionsArgs {
    /// Options subcommand
    #[command(subcommand)]
    pub command: OptionsCommand,
}

/// Options subcommands
#[derive(Debug, Subcommand)]
pub enum OptionsCommand {
    /// Show the options in effect
    Show,
    /// Change one or more options
    Set {
        /// Enable or disable AVIF handling
        #[arg(long)]
        enabled: Option<bool>,
        /// Handling mode: asis, convert or webp
        #[arg(long)]
        mode: Option<String>,
        /// Encoder quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
        /// Re-encode uploads kept as AVIF
        #[arg(long)]
        recompress: Option<bool>,
    },
}

/// Execute options commands
pub async fn execute(args: &OptionsArgs, host: &Host, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        OptionsCommand::Show => {
            let options = host.avif.options().await?;
            output::print_record(&options, format);
        }
        OptionsCommand::Set {
            enabled,
            mode,
            quality,
            recompress,
        } => {
            let mut options = host.avif.options().await?;
            if let Some(enabled) = enabled {
                options.enabled = *enabled;
            }
            if let Some(mode) = mode {
                options.handling_mode = mode.parse::<HandlingMode>()?;
            }
            if let Some(quality) = quality {
                options.quality = *quality;
            }
            if let Some(recompress) = recompress {
                options.recompress = *recompress;
            }

            options.save(host.avif.settings()).await?;
            output::print_success(&format!(
                "Options '{}' updated",
                host.avif.settings().option_name()
            ));
            output::print_record(&options, format);
        }
    }

    Ok(())
}
