//! Plugin registry: stores loaded plugin instances and metadata.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use crate::hooks::definitions::HookPoint;
use crate::hooks::registry::HookHandler;

/// Metadata about a loaded plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin identifier (also its option slug).
    pub id: String,
    /// Human-readable plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    pub description: String,
    /// Author or maintainer.
    pub author: String,
    /// Hook points this plugin registers for (filled in at load time).
    pub hooks: Vec<String>,
    /// Load priority (lower = loaded first).
    pub priority: i32,
}

/// Trait that all plugins must implement.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Called once when the plugin is loaded.
    async fn on_load(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called after the plugin's hooks are registered.
    async fn on_start(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called when the plugin is installed. Writes first-run defaults.
    async fn on_activate(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called when the plugin is stopped.
    async fn on_stop(&self) -> AppResult<()> {
        Ok(())
    }

    /// Returns the hook handlers this plugin wants registered.
    fn hook_handlers(&self) -> Vec<(HookPoint, Arc<dyn HookHandler>)>;
}

/// Registry of all loaded plugins.
#[derive(Debug)]
pub struct PluginRegistry {
    /// Plugin ID → plugin instance.
    plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
    /// Plugin ID → metadata.
    metadata: RwLock<HashMap<String, PluginInfo>>,
    /// Plugins whose activation already ran in this process.
    activated: RwLock<HashSet<String>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            metadata: RwLock::new(HashMap::new()),
            activated: RwLock::new(HashSet::new()),
        }
    }

    /// Registers a plugin under its metadata.
    pub async fn register(&self, plugin: Arc<dyn Plugin>, info: PluginInfo) -> AppResult<()> {
        let id = info.id.clone();

        let mut plugins = self.plugins.write().await;
        let mut metadata = self.metadata.write().await;

        if plugins.contains_key(&id) {
            return Err(AppError::conflict(format!(
                "Plugin '{}' is already registered",
                id
            )));
        }

        info!(plugin_id = %id, name = %info.name, version = %info.version, "Registering plugin");

        plugins.insert(id.clone(), plugin);
        metadata.insert(id, info);

        Ok(())
    }

    /// Unregisters a plugin by ID.
    pub async fn unregister(&self, plugin_id: &str) -> AppResult<Arc<dyn Plugin>> {
        let mut plugins = self.plugins.write().await;
        let mut metadata = self.metadata.write().await;

        let plugin = plugins
            .remove(plugin_id)
            .ok_or_else(|| AppError::not_found(format!("Plugin '{}' not found", plugin_id)))?;

        metadata.remove(plugin_id);
        self.activated.write().await.remove(plugin_id);

        info!(plugin_id = %plugin_id, "Plugin unregistered");

        Ok(plugin)
    }

    /// Gets a plugin by ID.
    pub async fn get(&self, plugin_id: &str) -> Option<Arc<dyn Plugin>> {
        let plugins = self.plugins.read().await;
        plugins.get(plugin_id).cloned()
    }

    /// Lists all registered plugin metadata, ordered by priority.
    pub async fn list(&self) -> Vec<PluginInfo> {
        let metadata = self.metadata.read().await;
        let mut infos: Vec<PluginInfo> = metadata.values().cloned().collect();
        infos.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    /// Records that a plugin's activation ran.
    ///
    /// Returns `false` if it was already recorded.
    pub async fn mark_activated(&self, plugin_id: &str) -> bool {
        self.activated.write().await.insert(plugin_id.to_string())
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
