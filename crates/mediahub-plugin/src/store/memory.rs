//! In-memory option store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use mediahub_core::result::AppResult;
use mediahub_core::traits::option_store::OptionStore;

/// Option store held entirely in memory. Used by tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    /// Option name → value.
    options: RwLock<HashMap<String, Value>>,
}

impl MemoryOptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with options.
    pub fn with_options(options: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            options: RwLock::new(options.into_iter().collect()),
        }
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get_option(&self, name: &str) -> AppResult<Option<Value>> {
        Ok(self.options.read().await.get(name).cloned())
    }

    async fn update_option(&self, name: &str, value: Value) -> AppResult<()> {
        self.options.write().await.insert(name.to_string(), value);
        Ok(())
    }

    async fn delete_option(&self, name: &str) -> AppResult<bool> {
        Ok(self.options.write().await.remove(name).is_some())
    }
}
