//! Capability registry: named optional providers other plugins can look up.
//!
//! Plugins never look each other up directly. The host registers what is
//! installed, and each request carries a [`CapabilitySet`] snapshot taken
//! when the request started.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

/// A named component installed alongside the host.
pub trait Capability: Send + Sync + std::fmt::Debug {
    /// Registry key (e.g. `"webp-support"`).
    fn name(&self) -> &str;

    /// Provider version string.
    fn version(&self) -> &str {
        "0.0.0"
    }
}

/// A capability with no behavior beyond its presence.
#[derive(Debug, Clone)]
pub struct NamedCapability {
    /// Registry key.
    name: String,
    /// Provider version.
    version: String,
}

impl NamedCapability {
    /// Creates a marker capability.
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }
}

impl Capability for NamedCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Immutable view of the registry taken at the start of a request.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    /// Capability name → provider.
    providers: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilitySet {
    /// Builds a set from providers.
    pub fn from_providers(providers: impl IntoIterator<Item = Arc<dyn Capability>>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|p| (p.name().to_string(), p))
                .collect(),
        }
    }

    /// Whether a capability is present.
    pub fn is_available(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Returns the provider for a capability.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.providers.get(name).cloned()
    }

    /// Sorted capability names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Registry of capabilities installed in the host.
#[derive(Debug)]
pub struct CapabilityRegistry {
    /// Capability name → provider.
    providers: RwLock<HashMap<String, Arc<dyn Capability>>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) a provider under its name.
    pub async fn register(&self, provider: Arc<dyn Capability>) {
        let name = provider.name().to_string();
        info!(capability = %name, version = %provider.version(), "Capability registered");
        self.providers.write().await.insert(name, provider);
    }

    /// Removes a capability. Returns `true` if it was registered.
    pub async fn unregister(&self, name: &str) -> bool {
        let removed = self.providers.write().await.remove(name).is_some();
        if removed {
            info!(capability = %name, "Capability unregistered");
        }
        removed
    }

    /// Takes a snapshot for one request.
    pub async fn snapshot(&self) -> CapabilitySet {
        CapabilitySet {
            providers: self.providers.read().await.clone(),
        }
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
