//! Simulated upload command.
//!
//! Copies the file into the uploads directory the way the host stores an
//! upload, then runs it through `upload_mimes` and `handle_upload`. A name
//! already taken in the uploads directory gets a numeric suffix, so existing
//! uploads and a source that already lives there are never overwritten.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::types::{ImageFormat, UploadDescriptor, unique_file_name};
use mediahub_plugin::hooks::definitions::HookPoint;

use super::Host;
use super::mimes::allowed_mimes;
use crate::output::{self, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Declared MIME type (guessed from the extension when omitted)
    #[arg(short, long)]
    pub mime: Option<String>,
}

/// Execute the upload command
pub async fn execute(args: &UploadArgs, host: &Host, format: OutputFormat) -> Result<(), AppError> {
    if !args.file.is_file() {
        return Err(AppError::not_found(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation("Upload path has no usable file name"))?
        .to_string();
    let extension = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let allowed = allowed_mimes(host).await?;
    let Some(allowed_mime) = allowed.get(&extension) else {
        return Err(AppError::validation(format!(
            "Sorry, the file type '.{}' is not permitted",
            extension
        )));
    };

    let mime_type = args
        .mime
        .clone()
        .or_else(|| ImageFormat::from_extension(&extension).map(|f| f.mime_type().to_string()))
        .unwrap_or_else(|| allowed_mime.to_string());

    let upload = store_upload(host, &args.file, &file_name, &mime_type).await?;
    info!(file = %upload.file.display(), mime = %upload.mime_type, "Upload stored");

    let ctx = host.manager.request_context().await;
    let result = host
        .manager
        .dispatcher()
        .apply_filter(HookPoint::HandleUpload, &ctx, "upload", &upload)
        .await?;

    if result == upload {
        output::print_success(&format!("Stored '{}' unchanged", file_name));
    } else {
        output::print_success(&format!(
            "Stored '{}' as {}",
            file_name, result.mime_type
        ));
    }
    output::print_record(&result, format);
    Ok(())
}

/// Copies the source into the uploads directory and describes it.
async fn store_upload(
    host: &Host,
    source: &Path,
    file_name: &str,
    mime_type: &str,
) -> Result<UploadDescriptor, AppError> {
    let directory = PathBuf::from(&host.config.uploads.directory);
    tokio::fs::create_dir_all(&directory).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to create uploads directory: {}", directory.display()),
            e,
        )
    })?;

    let stored_name = unique_file_name(&directory, file_name);
    if stored_name != file_name {
        info!(requested = %file_name, stored = %stored_name, "Upload name taken, using a free one");
    }

    let dest = directory.join(&stored_name);
    tokio::fs::copy(source, &dest).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to store upload: {}", dest.display()),
            e,
        )
    })?;

    let url = format!(
        "{}/{}",
        host.config.uploads.base_url.trim_end_matches('/'),
        stored_name
    );
    Ok(UploadDescriptor::new(dest, url, mime_type))
}
