//! Settings lifecycle: shared option plumbing composed into plugins.
//!
//! A plugin holds an `Arc<SettingsLifecycle>` instead of re-implementing
//! option naming, read-through access, first-run defaults, and schema
//! registration.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use mediahub_core::result::AppResult;
use mediahub_core::traits::option_store::OptionStore;

use super::schema::SettingsBlueprint;

/// Slug-scoped option access plus the plugin's registered settings schema.
#[derive(Debug)]
pub struct SettingsLifecycle {
    /// Plugin slug; option names are derived from it.
    slug: String,
    /// Settings group the generated form posts to.
    settings_group: String,
    /// Backing option store.
    store: Arc<dyn OptionStore>,
    /// Schema registered by the plugin's `init` hook.
    blueprint: RwLock<Option<SettingsBlueprint>>,
}

impl SettingsLifecycle {
    /// Creates the lifecycle for one plugin.
    pub fn new(slug: &str, settings_group: &str, store: Arc<dyn OptionStore>) -> Self {
        Self {
            slug: slug.to_string(),
            settings_group: settings_group.to_string(),
            store,
            blueprint: RwLock::new(None),
        }
    }

    /// The plugin slug.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The settings group name.
    pub fn settings_group(&self) -> &str {
        &self.settings_group
    }

    /// Name of the option holding this plugin's record (`{slug}_options`).
    pub fn option_name(&self) -> String {
        format!("{}_options", self.slug)
    }

    /// Reads the whole option record from the store.
    ///
    /// An absent or non-object record reads as empty.
    pub async fn options(&self) -> AppResult<Map<String, Value>> {
        match self.store.get_option(&self.option_name()).await? {
            Some(Value::Object(map)) => Ok(map),
            Some(other) => {
                warn!(
                    option = %self.option_name(),
                    value = %other,
                    "Option record is not an object, ignoring"
                );
                Ok(Map::new())
            }
            None => Ok(Map::new()),
        }
    }

    /// Whether the option record has been written at all.
    pub async fn is_initialized(&self) -> AppResult<bool> {
        Ok(self.store.get_option(&self.option_name()).await?.is_some())
    }

    /// Reads one key from the record, falling back to `default`.
    ///
    /// Every call goes to the store; nothing is cached between calls.
    pub async fn get(&self, key: &str, default: Value) -> AppResult<Value> {
        Ok(self.options().await?.remove(key).unwrap_or(default))
    }

    /// Merges `values` into the record and writes it back.
    ///
    /// The read and the write are separate store calls, so this is not
    /// atomic: two concurrent updates can each drop the other's keys.
    pub async fn update(&self, values: Map<String, Value>) -> AppResult<()> {
        let mut record = self.options().await?;
        let changed: Vec<String> = values.keys().cloned().collect();
        record.extend(values);
        self.store
            .update_option(&self.option_name(), Value::Object(record))
            .await?;
        info!(option = %self.option_name(), keys = ?changed, "Options updated");
        Ok(())
    }

    /// Writes `defaults` if the record does not exist yet.
    ///
    /// Returns `true` if defaults were written. Existing data is never
    /// overwritten.
    pub async fn activate_defaults(&self, defaults: Map<String, Value>) -> AppResult<bool> {
        if self.is_initialized().await? {
            debug!(option = %self.option_name(), "Options already present, keeping them");
            return Ok(false);
        }
        self.store
            .update_option(&self.option_name(), Value::Object(defaults))
            .await?;
        info!(option = %self.option_name(), "Default options written");
        Ok(true)
    }

    /// Registers the plugin's settings schema with the generator.
    pub async fn init_settings_generator(&self, blueprint: SettingsBlueprint) {
        debug!(plugin = %self.slug, "Settings blueprint registered");
        *self.blueprint.write().await = Some(blueprint);
    }

    /// The registered schema, if `init` has run.
    pub async fn blueprint(&self) -> Option<SettingsBlueprint> {
        self.blueprint.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::settings::schema::{FieldSpec, SettingsSection};
    use crate::store::memory::MemoryOptionStore;

    fn lifecycle(store: Arc<MemoryOptionStore>) -> SettingsLifecycle {
        SettingsLifecycle::new("demo", "demo_group", store)
    }

    #[tokio::test]
    async fn test_absent_record_reads_defaults() {
        let settings = lifecycle(Arc::new(MemoryOptionStore::new()));
        assert_eq!(settings.option_name(), "demo_options");
        assert_eq!(settings.get("quality", json!(80)).await.expect("get"), json!(80));
        assert!(!settings.is_initialized().await.expect("initialized"));
    }

    #[tokio::test]
    async fn test_reads_are_not_cached() {
        let store = Arc::new(MemoryOptionStore::new());
        let settings = lifecycle(store.clone());

        store
            .update_option("demo_options", json!({ "enabled": 1 }))
            .await
            .expect("write");
        assert_eq!(settings.get("enabled", json!(0)).await.expect("get"), json!(1));

        store
            .update_option("demo_options", json!({ "enabled": 0 }))
            .await
            .expect("write");
        assert_eq!(settings.get("enabled", json!(1)).await.expect("get"), json!(0));
    }

    #[tokio::test]
    async fn test_update_merges_into_current_record() {
        let store = Arc::new(MemoryOptionStore::new());
        let settings = lifecycle(store.clone());

        let mut first = Map::new();
        first.insert("enabled".to_string(), json!(1));
        settings.update(first).await.expect("first update");

        let mut second = Map::new();
        second.insert("quality".to_string(), json!(60));
        settings.update(second).await.expect("second update");

        assert_eq!(
            store.get_option("demo_options").await.expect("read"),
            Some(json!({ "enabled": 1, "quality": 60 }))
        );
    }

    #[tokio::test]
    async fn test_activate_defaults_only_once() {
        let store = Arc::new(MemoryOptionStore::new());
        let settings = lifecycle(store.clone());

        let mut defaults = Map::new();
        defaults.insert("enabled".to_string(), json!(1));
        assert!(settings.activate_defaults(defaults.clone()).await.expect("activate"));

        let mut changed = Map::new();
        changed.insert("enabled".to_string(), json!(0));
        settings.update(changed).await.expect("update");

        assert!(!settings.activate_defaults(defaults).await.expect("activate again"));
        assert_eq!(
            store.get_option("demo_options").await.expect("read"),
            Some(json!({ "enabled": 0 }))
        );
    }

    #[tokio::test]
    async fn test_blueprint_registration() {
        let settings = lifecycle(Arc::new(MemoryOptionStore::new()));
        assert!(settings.blueprint().await.is_none());

        let bp = SettingsBlueprint::new().section(
            "config",
            SettingsSection::new("Demo").field("enabled", FieldSpec::switch("Enable", true)),
        );
        settings.init_settings_generator(bp.clone()).await;
        assert_eq!(settings.blueprint().await, Some(bp));
    }
}
