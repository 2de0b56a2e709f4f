//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use crate::capability::{Capability, CapabilitySet};
pub use crate::hooks::definitions::{HookAction, HookContext, HookPayload, HookPoint, HookResult};
pub use crate::hooks::registry::HookHandler;
pub use crate::registry::{Plugin, PluginInfo};
pub use crate::settings::{FieldSpec, SettingsBlueprint, SettingsLifecycle, SettingsSection};

pub use crate::{hook_payload, plugin_info};
