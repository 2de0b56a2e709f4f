//! Upload descriptor handed from the host to upload filters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::format::ImageFormat;

/// The record describing a single uploaded file as it moves through the
/// host's upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    /// Absolute path of the stored file.
    pub file: PathBuf,
    /// Public URL of the stored file.
    pub url: String,
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl UploadDescriptor {
    /// Creates a new descriptor.
    pub fn new(file: impl Into<PathBuf>, url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            url: url.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Whether the declared MIME type matches `mime`.
    ///
    /// Comparison ignores ASCII case and any `;`-separated parameters.
    pub fn is_type(&self, mime: &str) -> bool {
        let essence = self.mime_type.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case(mime)
    }

    /// Returns a descriptor pointing at the same upload re-encoded as `format`.
    ///
    /// The file and URL extensions are swapped and the MIME type replaced.
    pub fn with_format(&self, format: ImageFormat) -> Self {
        Self {
            file: self.file.with_extension(format.extension()),
            url: swap_url_extension(&self.url, format.extension()),
            mime_type: format.mime_type().to_string(),
        }
    }

    /// Returns a descriptor for the same upload stored under `file_name`
    /// in the same directory. File and URL are renamed together.
    pub fn with_file_name(&self, file_name: &str) -> Self {
        let (base, suffix) = split_url_suffix(&self.url);
        let name_start = base.rfind('/').map(|i| i + 1).unwrap_or(0);
        Self {
            file: self.file.with_file_name(file_name),
            url: format!("{}{}{}", &base[..name_start], file_name, suffix),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Picks a file name in `directory` that no existing file uses.
///
/// `photo.webp` becomes `photo-1.webp`, `photo-2.webp` and so on until a
/// free name is found.
pub fn unique_file_name(directory: &Path, file_name: &str) -> String {
    if !directory.join(file_name).exists() {
        return file_name.to_string();
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let extension = name.extension().and_then(|e| e.to_str());

    (1u32..)
        .map(|n| match extension {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        })
        .find(|candidate| !directory.join(candidate).exists())
        .unwrap_or_else(|| file_name.to_string())
}

/// Splits a URL into the part before any query or fragment and the rest.
fn split_url_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

fn swap_url_extension(url: &str, extension: &str) -> String {
    let (base, suffix) = split_url_suffix(url);
    let name_start = base.rfind('/').map(|i| i + 1).unwrap_or(0);
    let stem_end = match base[name_start..].rfind('.') {
        Some(dot) if dot > 0 => name_start + dot,
        _ => base.len(),
    };
    format!("{}.{}{}", &base[..stem_end], extension, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avif_upload() -> UploadDescriptor {
        UploadDescriptor::new(
            "/srv/uploads/2026/10/cat.avif",
            "https://example.com/uploads/2026/10/cat.avif",
            "image/avif",
        )
    }

    #[test]
    fn test_is_type() {
        let upload = avif_upload();
        assert!(upload.is_type("image/avif"));
        assert!(!upload.is_type("image/webp"));

        let with_params = UploadDescriptor::new("a.avif", "a.avif", "Image/AVIF; charset=binary");
        assert!(with_params.is_type("image/avif"));
    }

    #[test]
    fn test_with_format_swaps_extensions() {
        let converted = avif_upload().with_format(ImageFormat::Webp);
        assert_eq!(converted.file, PathBuf::from("/srv/uploads/2026/10/cat.webp"));
        assert_eq!(converted.url, "https://example.com/uploads/2026/10/cat.webp");
        assert_eq!(converted.mime_type, "image/webp");
    }

    #[test]
    fn test_url_query_is_preserved() {
        assert_eq!(
            swap_url_extension("https://cdn.test/a/b.avif?v=2", "webp"),
            "https://cdn.test/a/b.webp?v=2"
        );
        assert_eq!(swap_url_extension("https://cdn.test/a/noext", "webp"), "https://cdn.test/a/noext.webp");
    }

    #[test]
    fn test_with_file_name_renames_file_and_url() {
        let renamed = avif_upload().with_file_name("cat-1.avif");
        assert_eq!(renamed.file, PathBuf::from("/srv/uploads/2026/10/cat-1.avif"));
        assert_eq!(renamed.url, "https://example.com/uploads/2026/10/cat-1.avif");
        assert_eq!(renamed.mime_type, "image/avif");
    }

    #[test]
    fn test_unique_file_name_skips_taken_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(unique_file_name(dir.path(), "cat.webp"), "cat.webp");

        std::fs::write(dir.path().join("cat.webp"), b"x").expect("write");
        std::fs::write(dir.path().join("cat-1.webp"), b"x").expect("write");
        assert_eq!(unique_file_name(dir.path(), "cat.webp"), "cat-2.webp");

        std::fs::write(dir.path().join("notes"), b"x").expect("write");
        assert_eq!(unique_file_name(dir.path(), "notes"), "notes-1");
    }

    #[test]
    fn test_serde_uses_type_key() {
        let json = serde_json::to_value(avif_upload()).expect("serialize");
        assert_eq!(json["type"], "image/avif");
        let back: UploadDescriptor = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, avif_upload());
    }
}
