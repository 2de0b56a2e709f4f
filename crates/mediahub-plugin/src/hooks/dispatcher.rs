//! Hook dispatcher. Runs handlers in priority order and threads filter values.
//!
//! For filter hooks (`upload_mimes`, `handle_upload`):
//! - Handlers are called in priority order.
//! - `ContinueWith` data is merged into the payload before the next handler runs.
//! - `Halt` stops the chain and the filtered operation is refused.
//!
//! For action hooks (`init`, `admin_menu`):
//! - All handlers are called; `Halt` is logged and ignored.
//!
//! A handler error stops the chain and is returned to the caller unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use super::definitions::{HookAction, HookContext, HookPayload, HookPoint};
use super::registry::HookRegistry;

/// Aggregated result of dispatching a hook to all handlers.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Payload after every `ContinueWith` was applied.
    pub payload: HookPayload,
    /// Whether execution was halted.
    pub halted: bool,
    /// Halt reason (if halted).
    pub halt_reason: Option<String>,
    /// Plugin that halted (if halted).
    pub halted_by: Option<String>,
    /// Output reported through `Continue(Some(..))`, keyed by plugin ID.
    pub outputs: HashMap<String, serde_json::Value>,
    /// Number of handlers that ran.
    pub handled: usize,
}

/// Dispatches hooks to all registered handlers.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatches a hook to all registered handlers.
    pub async fn dispatch(&self, ctx: &HookContext, payload: HookPayload) -> AppResult<DispatchResult> {
        let handlers = self.registry.get_handlers(&payload.hook).await;
        let mut result = DispatchResult {
            payload,
            halted: false,
            halt_reason: None,
            halted_by: None,
            outputs: HashMap::new(),
            handled: 0,
        };

        if handlers.is_empty() {
            return Ok(result);
        }

        let hook = result.payload.hook.clone();
        debug!(
            hook = %hook,
            request_id = %ctx.request_id,
            handler_count = handlers.len(),
            "Dispatching hook"
        );

        for handler in &handlers {
            let action = match handler.execute(ctx, &result.payload).await {
                Ok(action) => action,
                Err(e) => {
                    error!(
                        hook = %hook,
                        plugin_id = %handler.plugin_id(),
                        handler = %handler.name(),
                        error = %e,
                        "Hook handler failed"
                    );
                    return Err(e);
                }
            };
            result.handled += 1;

            match action {
                HookAction::Continue(output) => {
                    debug!(
                        hook = %hook,
                        plugin_id = %handler.plugin_id(),
                        "Handler returned Continue"
                    );
                    if let Some(output) = output {
                        result.outputs.insert(handler.plugin_id().to_string(), output);
                    }
                }
                HookAction::ContinueWith(mods) => {
                    debug!(
                        hook = %hook,
                        plugin_id = %handler.plugin_id(),
                        modifications = mods.len(),
                        "Handler returned ContinueWith"
                    );
                    result.payload.data.extend(mods);
                }
                HookAction::Halt(reason) => {
                    if hook.is_filter() {
                        info!(
                            hook = %hook,
                            plugin_id = %handler.plugin_id(),
                            reason = %reason,
                            "Handler halted execution"
                        );
                        result.halted = true;
                        result.halt_reason = Some(reason);
                        result.halted_by = Some(handler.plugin_id().to_string());
                        break;
                    }
                    warn!(
                        hook = %hook,
                        plugin_id = %handler.plugin_id(),
                        "Handler returned Halt for action hook, ignoring"
                    );
                }
            }
        }

        Ok(result)
    }

    /// Fires a hook and returns an error if halted.
    pub async fn fire_or_halt(&self, ctx: &HookContext, payload: HookPayload) -> AppResult<DispatchResult> {
        let result = self.dispatch(ctx, payload).await?;

        if result.halted {
            let reason = result
                .halt_reason
                .clone()
                .unwrap_or_else(|| "Hook halted execution".to_string());
            let plugin = result
                .halted_by
                .clone()
                .unwrap_or_else(|| "unknown".to_string());

            return Err(AppError::authorization(format!(
                "Operation blocked by plugin '{}': {}",
                plugin, reason
            )));
        }

        Ok(result)
    }

    /// Runs a filter hook over a single typed value stored under `key`.
    ///
    /// Returns the value as rewritten by the handler chain.
    pub async fn apply_filter<T>(&self, hook: HookPoint, ctx: &HookContext, key: &str, value: &T) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let payload = HookPayload::new(hook).with_typed(key, value)?;
        let result = self.fire_or_halt(ctx, payload).await?;
        result.payload.get_typed(key)
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::capability::CapabilitySet;
    use crate::hooks::definitions::HookResult;
    use crate::hooks::registry::HookHandler;

    /// Appends a suffix to the string under `value`.
    #[derive(Debug)]
    struct Append {
        plugin: &'static str,
        suffix: &'static str,
        priority: i32,
    }

    #[async_trait]
    impl HookHandler for Append {
        fn name(&self) -> &str {
            "append"
        }

        fn plugin_id(&self) -> &str {
            self.plugin
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn execute(&self, _ctx: &HookContext, payload: &HookPayload) -> HookResult {
            let current: String = payload.get_typed("value")?;
            HookAction::replace("value", &format!("{current}{}", self.suffix))
        }
    }

    #[derive(Debug)]
    struct Halter;

    #[async_trait]
    impl HookHandler for Halter {
        fn name(&self) -> &str {
            "halter"
        }

        fn plugin_id(&self) -> &str {
            "halter"
        }

        fn priority(&self) -> i32 {
            50
        }

        async fn execute(&self, _ctx: &HookContext, _payload: &HookPayload) -> HookResult {
            Ok(HookAction::Halt("not today".to_string()))
        }
    }

    #[derive(Debug, Default)]
    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HookHandler for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn plugin_id(&self) -> &str {
            "failing"
        }

        async fn execute(&self, _ctx: &HookContext, _payload: &HookPayload) -> HookResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::external_service("codec exploded"))
        }
    }

    fn ctx() -> HookContext {
        HookContext::new(CapabilitySet::default())
    }

    #[tokio::test]
    async fn test_filter_chain_runs_in_priority_order() {
        let registry = Arc::new(HookRegistry::new());
        registry
            .register(HookPoint::UploadMimes, Arc::new(Append { plugin: "b", suffix: "-b", priority: 20 }))
            .await;
        registry
            .register(HookPoint::UploadMimes, Arc::new(Append { plugin: "a", suffix: "-a", priority: 10 }))
            .await;

        let dispatcher = HookDispatcher::new(registry);
        let out: String = dispatcher
            .apply_filter(HookPoint::UploadMimes, &ctx(), "value", &"x".to_string())
            .await
            .expect("filter");
        assert_eq!(out, "x-a-b");
    }

    #[tokio::test]
    async fn test_no_handlers_returns_input() {
        let dispatcher = HookDispatcher::new(Arc::new(HookRegistry::new()));
        let out: String = dispatcher
            .apply_filter(HookPoint::HandleUpload, &ctx(), "value", &"same".to_string())
            .await
            .expect("filter");
        assert_eq!(out, "same");
    }

    #[tokio::test]
    async fn test_halt_on_filter_is_error() {
        let registry = Arc::new(HookRegistry::new());
        registry.register(HookPoint::HandleUpload, Arc::new(Halter)).await;
        registry
            .register(HookPoint::HandleUpload, Arc::new(Append { plugin: "a", suffix: "-a", priority: 100 }))
            .await;

        let dispatcher = HookDispatcher::new(registry);
        let payload = HookPayload::new(HookPoint::HandleUpload).with_string("value", "x");
        let result = dispatcher.dispatch(&ctx(), payload.clone()).await.expect("dispatch");
        assert!(result.halted);
        assert_eq!(result.handled, 1);
        assert_eq!(result.halted_by.as_deref(), Some("halter"));

        let err = dispatcher.fire_or_halt(&ctx(), payload).await.expect_err("halted");
        assert!(err.message.contains("not today"));
    }

    #[tokio::test]
    async fn test_halt_on_action_hook_is_ignored() {
        let registry = Arc::new(HookRegistry::new());
        registry.register(HookPoint::Init, Arc::new(Halter)).await;

        let dispatcher = HookDispatcher::new(registry);
        let result = dispatcher
            .fire_or_halt(&ctx(), HookPayload::new(HookPoint::Init))
            .await
            .expect("not halted");
        assert!(!result.halted);
        assert_eq!(result.handled, 1);
    }

    #[tokio::test]
    async fn test_handler_error_bubbles() {
        let registry = Arc::new(HookRegistry::new());
        let failing = Arc::new(Failing::default());
        registry.register(HookPoint::HandleUpload, failing.clone()).await;

        let dispatcher = HookDispatcher::new(registry);
        let payload = HookPayload::new(HookPoint::HandleUpload).with_data("value", json!("x"));
        let err = dispatcher.dispatch(&ctx(), payload).await.expect_err("bubbles");
        assert_eq!(err.message, "codec exploded");
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }
}
