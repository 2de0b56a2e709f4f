//! Plugin settings: schema declaration and slug-scoped option access.

pub mod lifecycle;
pub mod schema;

pub use lifecycle::SettingsLifecycle;
pub use schema::{FieldSpec, FieldType, SettingsBlueprint, SettingsSection};
