//! Image codec collaborator trait.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AppError, ErrorKind};
use crate::types::{ImageFormat, UploadDescriptor};

/// Failures raised while re-encoding an uploaded image.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The codec cannot produce the requested format.
    #[error("Codec cannot encode {format}")]
    UnsupportedTarget {
        /// Requested output format.
        format: ImageFormat,
    },

    /// The source file could not be decoded.
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// Source file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// Encoding the output failed.
    #[error("Failed to encode {format}: {reason}")]
    Encode {
        /// Output format.
        format: ImageFormat,
        /// Encoder message.
        reason: String,
    },

    /// Quality outside `1..=100`.
    #[error("Quality {0} is outside 1..=100")]
    InvalidQuality(u8),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        let message = format!("Image conversion failed: {err}");
        match err {
            CodecError::InvalidQuality(_) => AppError::validation(message),
            other => AppError::with_source(ErrorKind::ExternalService, message, other),
        }
    }
}

/// A component capable of re-encoding or transcoding an uploaded image.
///
/// Implementations return a new descriptor for the produced file and leave
/// the caller's descriptor untouched.
#[async_trait]
pub trait ImageCodec: Send + Sync + std::fmt::Debug + 'static {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Whether this codec can encode `target`.
    fn supports(&self, target: ImageFormat) -> bool;

    /// Re-encode `upload` as `target` at `quality` (1..=100).
    async fn convert(
        &self,
        upload: &UploadDescriptor,
        target: ImageFormat,
        quality: u8,
    ) -> Result<UploadDescriptor, CodecError>;
}
