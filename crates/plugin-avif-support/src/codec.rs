//! Raster codec backed by the `image` and `webp` crates.
//!
//! Output is written next to the source with the target extension. When the
//! extension changes the source is removed, so the library keeps one file
//! per upload. If another file already holds the output name, a numeric
//! suffix is added instead of replacing it. Encoding runs on the blocking
//! pool.
//!
//! Decoding AVIF sources needs the `avif-decode` feature.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::avif::AvifEncoder;
use image::{DynamicImage, ImageReader};
use tracing::{debug, info, warn};

use mediahub_core::traits::codec::{CodecError, ImageCodec};
use mediahub_core::types::{ImageFormat, UploadDescriptor, unique_file_name};

/// Encoder speed for AVIF (1 = slowest/best, 10 = fastest).
pub const DEFAULT_AVIF_SPEED: u8 = 6;

/// Re-encodes uploads to AVIF or lossy WebP.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    /// AVIF encoder speed.
    avif_speed: u8,
}

impl RasterCodec {
    /// Creates a codec with the default AVIF speed.
    pub fn new() -> Self {
        Self {
            avif_speed: DEFAULT_AVIF_SPEED,
        }
    }

    /// Overrides the AVIF encoder speed.
    pub fn with_avif_speed(mut self, speed: u8) -> Self {
        self.avif_speed = speed.clamp(1, 10);
        self
    }
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageCodec for RasterCodec {
    fn name(&self) -> &str {
        "raster"
    }

    fn supports(&self, target: ImageFormat) -> bool {
        matches!(target, ImageFormat::Avif | ImageFormat::Webp)
    }

    async fn convert(
        &self,
        upload: &UploadDescriptor,
        target: ImageFormat,
        quality: u8,
    ) -> Result<UploadDescriptor, CodecError> {
        if !(1..=100).contains(&quality) {
            return Err(CodecError::InvalidQuality(quality));
        }
        if !self.supports(target) {
            return Err(CodecError::UnsupportedTarget { format: target });
        }

        let output = free_output(upload, target).await?;
        let source = upload.file.clone();
        let dest = output.file.clone();
        let speed = self.avif_speed;

        let bytes = {
            let source = source.clone();
            let dest = dest.clone();
            tokio::task::spawn_blocking(move || encode_file(&source, &dest, target, quality, speed))
                .await??
        };

        if dest != source {
            if let Err(e) = tokio::fs::remove_file(&source).await {
                warn!(
                    file = %source.display(),
                    error = %e,
                    "Converted upload but could not remove the original"
                );
            }
        }

        info!(
            source = %source.display(),
            output = %dest.display(),
            format = %target,
            quality,
            bytes,
            "Image re-encoded"
        );

        Ok(output)
    }
}

/// Descriptor for the converted file, renamed when the natural output name
/// belongs to a different existing file.
async fn free_output(upload: &UploadDescriptor, target: ImageFormat) -> Result<UploadDescriptor, CodecError> {
    let output = upload.with_format(target);
    if output.file == upload.file || !tokio::fs::try_exists(&output.file).await? {
        return Ok(output);
    }

    let free = match (
        output.file.parent(),
        output.file.file_name().and_then(|n| n.to_str()),
    ) {
        (Some(directory), Some(name)) => unique_file_name(directory, name),
        _ => return Ok(upload.with_format(target)),
    };
    warn!(taken = %output.file.display(), free = %free, "Output name taken, using a free one");
    Ok(output.with_file_name(&free))
}

/// Decodes `source`, encodes it as `target` and writes it to `dest`.
///
/// Returns the number of bytes written.
fn encode_file(
    source: &Path,
    dest: &Path,
    target: ImageFormat,
    quality: u8,
    avif_speed: u8,
) -> Result<u64, CodecError> {
    let img = decode(source)?;
    debug!(
        file = %source.display(),
        width = img.width(),
        height = img.height(),
        "Decoded upload"
    );

    let encoded = match target {
        ImageFormat::Webp => encode_webp(&img, quality),
        ImageFormat::Avif => encode_avif(&img, quality, avif_speed)?,
        other => return Err(CodecError::UnsupportedTarget { format: other }),
    };

    // Source and destination are the same file for in-place re-encodes.
    let tmp = temp_path(dest);
    std::fs::write(&tmp, &encoded)?;
    if let Err(e) = std::fs::rename(&tmp, dest) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(encoded.len() as u64)
}

fn decode(source: &Path) -> Result<DynamicImage, CodecError> {
    let decode_err = |reason: String| CodecError::Decode {
        path: source.to_path_buf(),
        reason,
    };

    ImageReader::open(source)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_err(e.to_string()))
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Vec<u8> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let encoded = webp::Encoder::from_rgba(&rgba, width, height).encode(f32::from(quality));
    encoded.to_vec()
}

fn encode_avif(img: &DynamicImage, quality: u8, speed: u8) -> Result<Vec<u8>, CodecError> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut out = Vec::new();
    let encoder = AvifEncoder::new_with_speed_quality(&mut out, speed, quality);
    rgba.write_with_encoder(encoder)
        .map_err(|e| CodecError::Encode {
            format: ImageFormat::Avif,
            reason: e.to_string(),
        })?;
    Ok(out)
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
