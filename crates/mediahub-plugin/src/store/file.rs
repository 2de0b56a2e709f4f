//! JSON file option store.
//!
//! All options live in one JSON object on disk. Reads go to the file every
//! time so edits made by another process are picked up; writes replace the
//! file atomically through a sibling temp file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::result::AppResult;
use mediahub_core::traits::option_store::OptionStore;

/// Option store persisted as a single JSON document.
#[derive(Debug)]
pub struct JsonFileOptionStore {
    /// Path of the JSON document.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileOptionStore {
    /// Opens (without creating) the store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document. A missing file is an empty document.
    async fn load(&self) -> AppResult<Map<String, Value>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read options file: {}", self.path.display()),
                    e,
                ));
            }
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AppError::new(
                ErrorKind::Serialization,
                format!("Options file is not a JSON object: {}", self.path.display()),
            )),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Serialization,
                format!("Options file is not valid JSON: {}", self.path.display()),
                e,
            )),
        }
    }

    /// Writes the whole document via temp file and rename.
    async fn persist(&self, options: &Map<String, Value>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create options directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let body = serde_json::to_vec_pretty(options)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &body).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write options file: {}", tmp.display()),
                e,
            )
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace options file: {}", self.path.display()),
                e,
            )
        })?;

        debug!(path = %self.path.display(), bytes = body.len(), "Options file written");
        Ok(())
    }
}

#[async_trait]
impl OptionStore for JsonFileOptionStore {
    async fn get_option(&self, name: &str) -> AppResult<Option<Value>> {
        Ok(self.load().await?.remove(name))
    }

    async fn update_option(&self, name: &str, value: Value) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut options = self.load().await?;
        options.insert(name.to_string(), value);
        self.persist(&options).await
    }

    async fn delete_option(&self, name: &str) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut options = self.load().await?;
        if options.remove(name).is_none() {
            return Ok(false);
        }
        self.persist(&options).await?;
        Ok(true)
    }
}
