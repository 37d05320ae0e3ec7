//! Ownership of loaded documents.
//!
//! There is no process-wide configuration: the host loads its documents
//! once, keeps the resulting [`ConfigRegistry`] or [`ConfigHandle`], and
//! passes it to whatever needs it.

use super::loader::ConfigManager;
use super::schema::ConfigSchema;
use crate::error::ConfigResult;
use arc_swap::ArcSwap;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loaded documents keyed by their type.
#[derive(Default)]
pub struct ConfigRegistry {
    configs: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ConfigRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `config`, replacing any earlier document of the same type.
    pub fn register<T: Any + Send + Sync>(&mut self, config: T) {
        self.configs.insert(TypeId::of::<T>(), Arc::new(config));
    }

    /// Shared copy of the document of type `T`, if registered.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.configs
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|config| config.downcast::<T>().ok())
    }

    /// Check if a document of type `T` is registered.
    pub fn contains<T: Any>(&self) -> bool {
        self.configs.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("len", &self.configs.len())
            .finish()
    }
}

/// A configuration file that can be loaded into a registry.
///
/// Lets managers of different document types be loaded as one batch.
pub trait ManagedConfig {
    /// Path of the managed file.
    fn path(&self) -> &Path;

    /// Run the load pipeline and store the document in `registry`.
    fn load_into(&self, registry: &mut ConfigRegistry) -> ConfigResult<()>;
}

impl<T> ManagedConfig for ConfigManager<T>
where
    T: ConfigSchema + Send + Sync + 'static,
{
    fn path(&self) -> &Path {
        ConfigManager::path(self)
    }

    fn load_into(&self, registry: &mut ConfigRegistry) -> ConfigResult<()> {
        let loaded = self.load()?;
        info!(
            path = %self.path().display(),
            config = type_name::<T>(),
            outcome = %loaded.outcome,
            "configuration registered"
        );
        registry.register(loaded.config);
        Ok(())
    }
}

/// Load every managed file in order. Stops at the first fatal error.
pub fn load_all(managers: &[&dyn ManagedConfig]) -> ConfigResult<ConfigRegistry> {
    let mut registry = ConfigRegistry::new();
    for manager in managers {
        manager.load_into(&mut registry)?;
    }
    Ok(registry)
}

/// Shared, reloadable view of one document.
///
/// Readers get an immutable snapshot; [`reload`](Self::reload) runs the
/// pipeline again and publishes a new snapshot without disturbing readers
/// that still hold the old one.
pub struct ConfigHandle<T> {
    manager: Arc<ConfigManager<T>>,
    current: Arc<ArcSwap<T>>,
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            current: Arc::clone(&self.current),
        }
    }
}

impl<T: ConfigSchema> ConfigHandle<T> {
    /// Load the document for the first time.
    pub fn load(manager: ConfigManager<T>) -> ConfigResult<Self> {
        let config = manager.load_or_create()?;
        Ok(Self {
            manager: Arc::new(manager),
            current: Arc::new(ArcSwap::from_pointee(config)),
        })
    }

    /// Current snapshot.
    pub fn get(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Re-run the pipeline and publish the result. On error the previous
    /// snapshot stays in place.
    pub fn reload(&self) -> ConfigResult<Arc<T>> {
        let config = Arc::new(self.manager.load_or_create()?);
        self.current.store(Arc::clone(&config));
        info!(path = %self.manager.path().display(), "configuration reloaded");
        Ok(config)
    }

    /// Manager the handle reloads through.
    pub fn manager(&self) -> &ConfigManager<T> {
        &self.manager
    }
}
