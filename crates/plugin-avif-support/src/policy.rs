//! Upload interception policy.
//!
//! [`plan`] is a pure decision over the upload, the options and whether the
//! WebP codec is installed. [`decide`] carries the plan out against a codec.
//! Neither touches the option store.

use tracing::{debug, info};

use mediahub_core::traits::codec::{CodecError, ImageCodec};
use mediahub_core::types::{ImageFormat, UploadDescriptor};

use crate::options::{AvifOptions, HandlingMode, MAX_QUALITY, MIN_QUALITY};

/// What should happen to one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    /// Hand the upload back untouched.
    PassThrough,
    /// Re-encode the upload.
    Convert {
        /// Output format.
        target: ImageFormat,
        /// Encoder quality, `1..=100`.
        quality: u8,
    },
}

/// Decides how to treat an upload.
pub fn plan(upload: &UploadDescriptor, options: &AvifOptions, alternate_available: bool) -> UploadAction {
    if !options.enabled || !upload.is_type(ImageFormat::Avif.mime_type()) {
        return UploadAction::PassThrough;
    }

    let quality = options.quality.clamp(MIN_QUALITY, MAX_QUALITY);
    let as_is = if options.recompress {
        UploadAction::Convert {
            target: ImageFormat::Avif,
            quality,
        }
    } else {
        UploadAction::PassThrough
    };

    match &options.handling_mode {
        HandlingMode::ConvertToAlternate if alternate_available => UploadAction::Convert {
            target: ImageFormat::Webp,
            quality,
        },
        HandlingMode::ConvertToPrimary => UploadAction::Convert {
            target: ImageFormat::Avif,
            quality,
        },
        HandlingMode::ConvertToAlternate
        | HandlingMode::AsIs
        | HandlingMode::Unrecognized(_) => as_is,
    }
}

/// Applies [`plan`] to an upload, delegating conversions to `codec`.
///
/// Returns the descriptor the host should record. Codec failures are
/// returned unchanged.
pub async fn decide(
    upload: &UploadDescriptor,
    options: &AvifOptions,
    alternate_available: bool,
    codec: &dyn ImageCodec,
) -> Result<UploadDescriptor, CodecError> {
    match plan(upload, options, alternate_available) {
        UploadAction::PassThrough => {
            debug!(
                file = %upload.file.display(),
                mime = %upload.mime_type,
                mode = %options.handling_mode,
                "Upload passed through"
            );
            Ok(upload.clone())
        }
        UploadAction::Convert { target, quality } => {
            info!(
                file = %upload.file.display(),
                target = %target,
                quality,
                codec = %codec.name(),
                "Converting AVIF upload"
            );
            codec.convert(upload, target, quality).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avif() -> UploadDescriptor {
        UploadDescriptor::new("/u/cat.avif", "https://site.test/u/cat.avif", "image/avif")
    }

    fn options(mode: HandlingMode) -> AvifOptions {
        AvifOptions {
            handling_mode: mode,
            ..AvifOptions::default()
        }
    }

    #[test]
    fn test_disabled_passes_everything() {
        let opts = AvifOptions {
            enabled: false,
            handling_mode: HandlingMode::ConvertToAlternate,
            ..AvifOptions::default()
        };
        assert_eq!(plan(&avif(), &opts, true), UploadAction::PassThrough);
    }

    #[test]
    fn test_non_avif_passes() {
        let png = UploadDescriptor::new("/u/a.png", "a.png", "image/png");
        for mode in [
            HandlingMode::AsIs,
            HandlingMode::ConvertToPrimary,
            HandlingMode::ConvertToAlternate,
        ] {
            assert_eq!(plan(&png, &options(mode), true), UploadAction::PassThrough);
        }
    }

    #[test]
    fn test_webp_needs_capability() {
        let opts = options(HandlingMode::ConvertToAlternate);
        assert_eq!(
            plan(&avif(), &opts, true),
            UploadAction::Convert {
                target: ImageFormat::Webp,
                quality: 80
            }
        );
        assert_eq!(plan(&avif(), &opts, false), plan(&avif(), &options(HandlingMode::AsIs), false));
    }

    #[test]
    fn test_convert_and_recompress_target_avif() {
        let expected = UploadAction::Convert {
            target: ImageFormat::Avif,
            quality: 80,
        };
        assert_eq!(plan(&avif(), &options(HandlingMode::ConvertToPrimary), false), expected);

        let recompress = AvifOptions {
            recompress: true,
            ..AvifOptions::default()
        };
        assert_eq!(plan(&avif(), &recompress, false), expected);

        let fallback = AvifOptions {
            recompress: true,
            ..options(HandlingMode::ConvertToAlternate)
        };
        assert_eq!(plan(&avif(), &fallback, false), expected);
    }

    #[test]
    fn test_unrecognized_mode_is_as_is() {
        let opts = options(HandlingMode::Unrecognized("gif".to_string()));
        assert_eq!(plan(&avif(), &opts, true), UploadAction::PassThrough);
    }

    #[test]
    fn test_mime_match_ignores_case_and_params() {
        let upload = UploadDescriptor::new("/u/a.avif", "a.avif", "IMAGE/AVIF; q=1");
        assert_ne!(
            plan(&upload, &options(HandlingMode::ConvertToPrimary), false),
            UploadAction::PassThrough
        );
    }
}
