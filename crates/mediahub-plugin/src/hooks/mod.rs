//! Hook system: registry, dispatcher and hook definitions.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{HookAction, HookContext, HookPayload, HookPoint, HookResult};
pub use dispatcher::{DispatchResult, HookDispatcher};
pub use registry::{HookHandler, HookRegistry};
