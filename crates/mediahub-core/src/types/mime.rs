//! MIME allowlist: file extension to content type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extension → MIME mapping the host accepts for upload.
///
/// Keys are lowercase extensions without the leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeMap(BTreeMap<String, String>);

impl MimeMap {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The allowlist a stock media library ships with.
    pub fn host_defaults() -> Self {
        [
            ("jpg", "image/jpeg"),
            ("jpeg", "image/jpeg"),
            ("jpe", "image/jpeg"),
            ("png", "image/png"),
            ("gif", "image/gif"),
            ("webp", "image/webp"),
            ("bmp", "image/bmp"),
            ("pdf", "application/pdf"),
        ]
        .into_iter()
        .collect()
    }

    /// Inserts or replaces an entry, returning the previous MIME string.
    pub fn insert(&mut self, extension: &str, mime: &str) -> Option<String> {
        self.0
            .insert(extension.to_ascii_lowercase(), mime.to_string())
    }

    /// Returns the MIME string registered for an extension.
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.0
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether an extension is allowed.
    pub fn allows(&self, extension: &str) -> bool {
        self.get(extension).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in extension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MimeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
                .collect(),
        )
    }
}
