//! # mediahub-plugin
//!
//! Plugin framework for MediaHub. Provides:
//!
//! - Plugin lifecycle management (load, start, activate, stop, unload)
//! - Hook registry with priority-ordered registration
//! - Filter dispatcher: each handler sees the value produced by the previous one
//! - Capability registry, snapshotted once per request
//! - Settings lifecycle: slug-scoped option access and schema declaration
//! - Option store backends (in-memory, JSON file)

pub mod capability;
pub mod hooks;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod settings;
pub mod store;

pub use capability::{Capability, CapabilityRegistry, CapabilitySet};
pub use hooks::definitions::{HookAction, HookContext, HookPayload, HookPoint, HookResult};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::registry::{HookHandler, HookRegistry};
pub use manager::PluginManager;
pub use registry::{Plugin, PluginInfo, PluginRegistry};
pub use settings::{SettingsBlueprint, SettingsLifecycle};
