//! Hook registry. Plugins register handlers by hook point with priority ordering.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::definitions::{HookContext, HookPayload, HookPoint, HookResult};

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handler name used in logs.
    fn name(&self) -> &str;

    /// Returns the plugin ID owning this handler.
    fn plugin_id(&self) -> &str;

    /// Returns the priority (lower = runs first).
    fn priority(&self) -> i32 {
        100
    }

    /// Handles a hook invocation.
    async fn execute(&self, ctx: &HookContext, payload: &HookPayload) -> HookResult;
}

/// Entry in the hook registry.
#[derive(Debug)]
struct HookEntry {
    /// The handler.
    handler: Arc<dyn HookHandler>,
    /// Priority (lower = earlier execution).
    priority: i32,
    /// Plugin that registered this handler.
    plugin_id: String,
}

/// Registry of hook handlers organized by hook point.
#[derive(Debug)]
pub struct HookRegistry {
    /// Hook point → sorted list of handlers.
    handlers: RwLock<HashMap<HookPoint, Vec<HookEntry>>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler for a specific hook point.
    ///
    /// Handlers with equal priority keep their registration order.
    pub async fn register(&self, hook: HookPoint, handler: Arc<dyn HookHandler>) {
        let plugin_id = handler.plugin_id().to_string();
        let priority = handler.priority();
        let name = handler.name().to_string();

        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(hook.clone()).or_default();

        entries.push(HookEntry {
            handler,
            priority,
            plugin_id: plugin_id.clone(),
        });

        // Stable sort keeps insertion order within a priority
        entries.sort_by_key(|e| e.priority);

        info!(
            hook = %hook,
            plugin_id = %plugin_id,
            handler = %name,
            priority = priority,
            "Hook handler registered"
        );
    }

    /// Unregisters all handlers for a specific plugin.
    pub async fn unregister_plugin(&self, plugin_id: &str) {
        let mut handlers = self.handlers.write().await;

        for entries in handlers.values_mut() {
            entries.retain(|e| e.plugin_id != plugin_id);
        }

        handlers.retain(|_, entries| !entries.is_empty());

        info!(plugin_id = %plugin_id, "All hooks unregistered for plugin");
    }

    /// Returns all handlers for a specific hook point, sorted by priority.
    pub async fn get_handlers(&self, hook: &HookPoint) -> Vec<Arc<dyn HookHandler>> {
        let handlers = self.handlers.read().await;
        handlers
            .get(hook)
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
