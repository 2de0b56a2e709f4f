//! # mediahub-core
//!
//! Core crate for MediaHub. Contains the configuration schema, the
//! option-store and image-codec traits, upload and MIME types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other MediaHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
