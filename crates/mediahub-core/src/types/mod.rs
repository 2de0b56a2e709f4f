//! Core type definitions used across the MediaHub workspace.

pub mod format;
pub mod mime;
pub mod upload;

pub use format::ImageFormat;
pub use mime::MimeMap;
pub use upload::{UploadDescriptor, unique_file_name};
