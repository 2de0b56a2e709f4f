//! Error type for the AVIF support plugin.

use mediahub_core::error::AppError;
use mediahub_core::traits::codec::CodecError;
use thiserror::Error;

/// Errors raised by the AVIF plugin.
#[derive(Debug, Error)]
pub enum AvifError {
    /// The codec collaborator failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A handling mode string outside `asis`, `convert`, `webp`.
    #[error("Unknown handling mode '{0}' (expected asis, convert or webp)")]
    UnknownMode(String),

    /// Options failed validation.
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] validator::ValidationErrors),

    /// Reading or writing the option store failed.
    #[error("Option store error: {0}")]
    Store(#[from] AppError),
}

impl From<AvifError> for AppError {
    fn from(err: AvifError) -> Self {
        match err {
            AvifError::Codec(e) => e.into(),
            AvifError::Store(e) => e,
            AvifError::UnknownMode(_) | AvifError::InvalidOptions(_) => {
                AppError::validation(err.to_string())
            }
        }
    }
}
