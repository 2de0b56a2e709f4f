//! Hook point definitions, payloads, and per-request context.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

use crate::capability::CapabilitySet;

/// Enumeration of all hook points the media host fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    // ── Lifecycle ──
    /// Fired once per process after plugins are loaded. Plugins declare
    /// their settings schema here.
    Init,
    /// Fired while the admin menu is assembled.
    AdminMenu,

    // ── Upload filters ──
    /// Filter over the extension → MIME allowlist (data key `mimes`).
    UploadMimes,
    /// Filter over a just-stored upload (data key `upload`).
    HandleUpload,
}

impl HookPoint {
    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AdminMenu => "admin_menu",
            Self::UploadMimes => "upload_mimes",
            Self::HandleUpload => "handle_upload",
        }
    }

    /// Returns whether this hook is a filter: handlers rewrite the payload
    /// and may halt the surrounding operation.
    pub fn is_filter(&self) -> bool {
        matches!(self, Self::UploadMimes | Self::HandleUpload)
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload passed to hook handlers, a flexible key-value map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookPayload {
    /// The hook point being fired.
    pub hook: HookPoint,
    /// Arbitrary data keyed by string.
    pub data: HashMap<String, serde_json::Value>,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
}

impl HookPayload {
    /// Creates a new hook payload.
    pub fn new(hook: HookPoint) -> Self {
        Self {
            hook,
            data: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Inserts a data value.
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Inserts a string value.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_data(key, serde_json::json!(value))
    }

    /// Serializes `value` under `key`.
    pub fn with_typed<T: Serialize>(self, key: &str, value: &T) -> AppResult<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.with_data(key, value))
    }

    /// Deserializes the value under `key`.
    ///
    /// Missing keys are reported as validation errors: a filter handler
    /// cannot do its job without its subject.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> AppResult<T> {
        let value = self.data.get(key).cloned().ok_or_else(|| {
            AppError::validation(format!("{} payload is missing '{}'", self.hook, key))
        })?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Per-request context handed to every handler of one dispatch.
///
/// Capabilities are resolved once when the context is built, so every
/// handler of the request sees the same set.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Identifier of the host request that fired the hook.
    pub request_id: Uuid,
    /// Capabilities present for this request.
    pub capabilities: CapabilitySet,
}

impl HookContext {
    /// Creates a context for a new request.
    pub fn new(capabilities: CapabilitySet) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            capabilities,
        }
    }
}

/// Action returned by a hook handler telling the dispatcher what to do next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HookAction {
    /// Continue to the next handler, optionally reporting output data.
    Continue(Option<serde_json::Value>),
    /// Continue with modified payload data; later handlers see the update.
    ContinueWith(HashMap<String, serde_json::Value>),
    /// Halt. No further handlers run and the filtered operation is refused.
    Halt(String),
}

impl HookAction {
    /// Shorthand for replacing a single payload key.
    pub fn replace<T: Serialize>(key: &str, value: &T) -> AppResult<Self> {
        let mut modifications = HashMap::new();
        modifications.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(Self::ContinueWith(modifications))
    }
}

/// Result returned from a hook handler invocation.
///
/// Errors are not swallowed by the dispatcher; they bubble to the caller.
pub type HookResult = Result<HookAction, AppError>;
