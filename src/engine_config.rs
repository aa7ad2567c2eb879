//! Engine configuration store.
//!
//! Persisted overrides live under a single key as one map. Every write
//! replaces the whole map, so mutators read the current map first.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::storage::{read_json, write_json, Storage, ENGINE_CONFIGS_KEY};
use crate::{engines, EngineConfiguration, Result};

/// Engine id → configuration.
pub type ConfigurationMap = BTreeMap<String, EngineConfiguration>;

/// Resolves and persists per-engine configuration.
pub struct ConfigStore {
    storage: Arc<dyn Storage>,
    defaults: ConfigurationMap,
}

impl ConfigStore {
    /// Creates a store over `storage`, seeded with the built-in defaults.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            defaults: builtin_defaults(),
        }
    }

    /// Returns the persisted overrides (empty when none or corrupt).
    pub fn persisted(&self) -> ConfigurationMap {
        read_json(self.storage.as_ref(), ENGINE_CONFIGS_KEY).unwrap_or_default()
    }

    /// Returns the effective configuration for `engine_id`.
    ///
    /// Lookup order: persisted override, built-in default, generic default.
    pub fn get_configuration(&self, engine_id: &str) -> EngineConfiguration {
        if let Some(config) = self.persisted().remove(engine_id) {
            return config;
        }
        self.default_for(engine_id)
    }

    /// Returns the built-in default for `engine_id`, or the generic default.
    pub fn default_for(&self, engine_id: &str) -> EngineConfiguration {
        self.defaults.get(engine_id).cloned().unwrap_or_default()
    }

    /// Returns the effective configuration of each engine in `engine_ids`.
    pub fn effective<'a>(&self, engine_ids: impl IntoIterator<Item = &'a str>) -> ConfigurationMap {
        let mut persisted = self.persisted();
        engine_ids
            .into_iter()
            .map(|id| {
                let config = persisted.remove(id).unwrap_or_else(|| self.default_for(id));
                (id.to_string(), config)
            })
            .collect()
    }

    /// Replaces the entire persisted map.
    pub fn set_configurations(&self, configs: &ConfigurationMap) -> Result<()> {
        write_json(self.storage.as_ref(), ENGINE_CONFIGS_KEY, configs)?;
        debug!("Saved {} engine configurations", configs.len());
        Ok(())
    }

    /// Read-modify-write of a single engine's configuration.
    pub fn update_configuration(&self, engine_id: &str, config: EngineConfiguration) -> Result<()> {
        let mut configs = self.persisted();
        configs.insert(engine_id.to_string(), config);
        self.set_configurations(&configs)
    }

    /// Read-modify-write removal of a single engine's configuration.
    pub fn remove_configuration(&self, engine_id: &str) -> Result<()> {
        let mut configs = self.persisted();
        if configs.remove(engine_id).is_some() {
            self.set_configurations(&configs)?;
        }
        Ok(())
    }
}

/// Default configurations of the built-in engines.
pub fn builtin_defaults() -> ConfigurationMap {
    engines::builtin()
        .iter()
        .map(|e| (e.id().to_string(), e.configuration().clone()))
        .collect()
}
