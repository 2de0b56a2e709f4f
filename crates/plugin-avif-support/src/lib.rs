//! # Plugin AVIF Support
//!
//! A MediaHub plugin that lets AVIF images (`image/avif`, extension `avif`)
//! into the media library.
//!
//! - `upload_mimes`: adds `avif → image/avif` to the allowlist while enabled.
//! - `handle_upload`: keeps AVIF uploads as they are, re-encodes them in
//!   place, or hands them to the WebP codec when the `webp-support`
//!   capability is installed.
//! - `init`: publishes the settings blueprint for the settings generator.
//!
//! Options live under `avif-support_options` and are re-read on every
//! request, so changes apply to the next upload without a restart.

pub mod codec;
pub mod error;
pub mod hooks;
pub mod mime;
pub mod options;
pub mod plugin;
pub mod policy;
pub mod settings;

pub use codec::RasterCodec;
pub use error::AvifError;
pub use options::{AvifOptions, HandlingMode};
pub use plugin::{AvifSupportPlugin, SLUG, WEBP_CAPABILITY};
pub use policy::{UploadAction, decide, plan};
