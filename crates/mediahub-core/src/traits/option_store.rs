//! Option store trait for persistent plugin configuration.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;

/// Persistent key-value configuration shared by the host and its plugins.
///
/// Option names are flat strings; plugins scope theirs with a slug prefix
/// (e.g. `avif-support_options`). Values are arbitrary JSON.
#[async_trait]
pub trait OptionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get an option by name. Returns `None` if it was never written.
    async fn get_option(&self, name: &str) -> AppResult<Option<Value>>;

    /// Create or replace an option.
    async fn update_option(&self, name: &str, value: Value) -> AppResult<()>;

    /// Remove an option. Returns `true` if it existed.
    async fn delete_option(&self, name: &str) -> AppResult<bool>;
}
