//! Settings blueprint published on `init`.

use mediahub_plugin::settings::{FieldSpec, SettingsBlueprint, SettingsSection};

use crate::options::{DEFAULT_QUALITY, HandlingMode, MAX_QUALITY, MIN_QUALITY};

/// Builds the schema for the settings generator.
///
/// The WebP choice is offered only when the `webp-support` capability is
/// present for the request.
pub fn build_blueprint(webp_available: bool) -> SettingsBlueprint {
    let mut modes = vec![
        ("asis", "Upload as a .avif file."),
        ("convert", "Re-encode uploads as optimized .avif files."),
    ];
    if webp_available {
        modes.push(("webp", "Convert uploads to .webp files."));
    }

    let mode_help = if webp_available {
        "Choose how to handle image uploads for .avif compatibility."
    } else {
        "WebP conversion requires the WebP Support plugin."
    };

    let section = SettingsSection::new("AVIF Configuration")
        .field(
            "enabled",
            FieldSpec::switch("Enable AVIF File Uploads", true)
                .with_description("Allows .avif files to be uploaded to the Media Library.")
                .as_parent(),
        )
        .field(
            "handling_mode",
            FieldSpec::radio("AVIF Handling Mode", modes, HandlingMode::AsIs.as_str())
                .with_description(mode_help)
                .with_parent("enabled"),
        )
        .field(
            "quality",
            FieldSpec::number(
                "Compression Quality",
                i64::from(MIN_QUALITY),
                i64::from(MAX_QUALITY),
                i64::from(DEFAULT_QUALITY),
            )
            .with_description("Set image quality from 1-100 (Default: 80).")
            .with_parent("enabled"),
        )
        .field(
            "recompress",
            FieldSpec::switch("Recompress AVIF Uploads", false)
                .with_description("Re-encode uploads kept as .avif at the configured quality.")
                .with_parent("enabled"),
        );

    SettingsBlueprint::new().section("config", section)
}
