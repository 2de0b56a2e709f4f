//! Plugin manager: lifecycle management for all plugins.

use std::sync::Arc;

use tracing::{error, info, warn};

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use crate::capability::CapabilityRegistry;
use crate::hooks::definitions::{HookContext, HookPayload, HookPoint};
use crate::hooks::dispatcher::{DispatchResult, HookDispatcher};
use crate::hooks::registry::HookRegistry;
use crate::registry::{Plugin, PluginInfo, PluginRegistry};

/// Manages the full lifecycle of plugins: load, start, activate, stop, unload.
#[derive(Debug)]
pub struct PluginManager {
    /// Plugin registry.
    plugin_registry: Arc<PluginRegistry>,
    /// Hook registry.
    hook_registry: Arc<HookRegistry>,
    /// Hook dispatcher.
    hook_dispatcher: Arc<HookDispatcher>,
    /// Installed capabilities.
    capabilities: Arc<CapabilityRegistry>,
}

impl PluginManager {
    /// Creates a new plugin manager sharing the given capability registry.
    pub fn new(capabilities: Arc<CapabilityRegistry>) -> Self {
        let hook_registry = Arc::new(HookRegistry::new());
        let hook_dispatcher = Arc::new(HookDispatcher::new(hook_registry.clone()));

        Self {
            plugin_registry: Arc::new(PluginRegistry::new()),
            hook_registry,
            hook_dispatcher,
            capabilities,
        }
    }

    /// Loads and starts a compiled-in plugin.
    pub async fn load_plugin(&self, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let handlers = plugin.hook_handlers();
        let mut info = plugin.info();
        info.hooks = handlers.iter().map(|(hook, _)| hook.to_string()).collect();
        let plugin_id = info.id.clone();

        // Load
        plugin.on_load().await.map_err(|e| {
            AppError::plugin(format!("Plugin '{}' load failed: {}", plugin_id, e))
        })?;

        // Register
        self.plugin_registry
            .register(plugin.clone(), info.clone())
            .await?;

        // Register hooks
        for (hook_point, handler) in handlers {
            self.hook_registry.register(hook_point, handler).await;
        }

        // Start
        if let Err(e) = plugin.on_start().await {
            error!(plugin_id = %plugin_id, error = %e, "Plugin start failed");
            self.hook_registry.unregister_plugin(&plugin_id).await;
            self.plugin_registry.unregister(&plugin_id).await?;
            return Err(AppError::plugin(format!(
                "Plugin '{}' start failed: {}",
                plugin_id, e
            )));
        }

        info!(
            plugin_id = %plugin_id,
            name = %info.name,
            version = %info.version,
            hooks = info.hooks.len(),
            "Plugin loaded and started"
        );

        Ok(())
    }

    /// Runs a plugin's install-time activation.
    ///
    /// Returns `false` without calling the plugin if activation already ran
    /// in this process.
    pub async fn activate(&self, plugin_id: &str) -> AppResult<bool> {
        let plugin = self
            .plugin_registry
            .get(plugin_id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{}' not found", plugin_id)))?;

        if !self.plugin_registry.mark_activated(plugin_id).await {
            info!(plugin_id = %plugin_id, "Plugin already activated");
            return Ok(false);
        }

        plugin.on_activate().await.map_err(|e| {
            AppError::plugin(format!("Plugin '{}' activation failed: {}", plugin_id, e))
        })?;

        info!(plugin_id = %plugin_id, "Plugin activated");
        Ok(true)
    }

    /// Stops and unloads a plugin.
    pub async fn unload_plugin(&self, plugin_id: &str) -> AppResult<()> {
        let plugin = self
            .plugin_registry
            .get(plugin_id)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{}' not found", plugin_id)))?;

        if let Err(e) = plugin.on_stop().await {
            warn!(
                plugin_id = %plugin_id,
                error = %e,
                "Plugin stop returned error"
            );
        }

        self.hook_registry.unregister_plugin(plugin_id).await;
        self.plugin_registry.unregister(plugin_id).await?;

        info!(plugin_id = %plugin_id, "Plugin unloaded");

        Ok(())
    }

    /// Stops and unloads all plugins.
    pub async fn unload_all(&self) {
        for info in self.plugin_registry.list().await {
            if let Err(e) = self.unload_plugin(&info.id).await {
                error!(
                    plugin_id = %info.id,
                    error = %e,
                    "Error unloading plugin"
                );
            }
        }

        info!("All plugins unloaded");
    }

    /// Builds the context for a new host request.
    ///
    /// Capabilities are snapshotted here, once per request.
    pub async fn request_context(&self) -> HookContext {
        HookContext::new(self.capabilities.snapshot().await)
    }

    /// Fires the `init` action hook.
    pub async fn init(&self) -> AppResult<DispatchResult> {
        let ctx = self.request_context().await;
        self.hook_dispatcher
            .fire_or_halt(&ctx, HookPayload::new(HookPoint::Init))
            .await
    }

    /// Returns the hook dispatcher for firing hooks.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.hook_dispatcher
    }

    /// Returns the capability registry.
    pub fn capabilities(&self) -> &Arc<CapabilityRegistry> {
        &self.capabilities
    }

    /// Lists all loaded plugins.
    pub async fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugin_registry.list().await
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new(Arc::new(CapabilityRegistry::new()))
    }
}
