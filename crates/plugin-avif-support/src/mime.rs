//! MIME allowlist extension.

use tracing::debug;

use mediahub_core::types::{ImageFormat, MimeMap};

use crate::options::AvifOptions;

/// Adds `avif → image/avif` to the allowlist while the plugin is enabled.
///
/// Any existing `avif` entry is overwritten. Calling this twice gives the
/// same result as calling it once.
pub fn extend(mut mimes: MimeMap, options: &AvifOptions) -> MimeMap {
    if options.enabled {
        let avif = ImageFormat::Avif;
        if mimes.insert(avif.extension(), avif.mime_type()).is_none() {
            debug!(extension = avif.extension(), "AVIF added to upload allowlist");
        }
    }
    mimes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_adds_avif() {
        let mimes = extend(MimeMap::host_defaults(), &AvifOptions::default());
        assert_eq!(mimes.get("avif"), Some("image/avif"));
        assert_eq!(mimes.len(), MimeMap::host_defaults().len() + 1);
    }

    #[test]
    fn test_disabled_is_identity() {
        let disabled = AvifOptions {
            enabled: false,
            ..AvifOptions::default()
        };
        assert_eq!(extend(MimeMap::host_defaults(), &disabled), MimeMap::host_defaults());
    }

    #[test]
    fn test_idempotent_and_overwrites() {
        let opts = AvifOptions::default();
        let once = extend(MimeMap::host_defaults(), &opts);
        assert_eq!(extend(once.clone(), &opts), once);

        let stale: MimeMap = [("avif", "application/octet-stream")].into_iter().collect();
        assert_eq!(extend(stale, &opts).get("avif"), Some("image/avif"));
    }
}
