//! Engine catalog: built-in engines plus user-added custom engines.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine_config::ConfigStore;
use crate::storage::{read_json, write_json, Storage, CUSTOM_ENGINES_KEY, ENABLED_ENGINES_KEY};
use crate::{engines, DorkError, EngineConfiguration, Result, SearchEngine};

/// Merged, addressable catalog of search engines.
///
/// Removing a custom engine also drops it from the enabled set and from the
/// configuration map before the call returns.
pub struct EngineRegistry {
    storage: Arc<dyn Storage>,
    builtin: Vec<SearchEngine>,
    configs: ConfigStore,
}

impl EngineRegistry {
    /// Creates a registry over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let builtin = engines::builtin()
            .iter()
            .map(|e| e.engine().clone())
            .collect();
        Self {
            configs: ConfigStore::new(storage.clone()),
            storage,
            builtin,
        }
    }

    /// The configuration store sharing this registry's storage.
    pub fn configurations(&self) -> &ConfigStore {
        &self.configs
    }

    /// Built-in engines, in fixed order.
    pub fn builtin_engines(&self) -> &[SearchEngine] {
        &self.builtin
    }

    /// User-added engines, in insertion order.
    pub fn custom_engines(&self) -> Vec<SearchEngine> {
        read_json(self.storage.as_ref(), CUSTOM_ENGINES_KEY).unwrap_or_default()
    }

    /// Built-ins followed by custom engines.
    pub fn list_all_engines(&self) -> Vec<SearchEngine> {
        let mut all = self.builtin.clone();
        all.extend(self.custom_engines());
        all
    }

    /// Returns true if `id` names a built-in engine.
    pub fn is_builtin(&self, id: &str) -> bool {
        self.builtin.iter().any(|e| e.id == id)
    }

    /// Looks up one engine by id.
    pub fn find(&self, id: &str) -> Option<SearchEngine> {
        self.list_all_engines().into_iter().find(|e| e.id == id)
    }

    /// Resolves ids to engines in the given order, skipping unknown ids.
    pub fn resolve(&self, ids: &[String]) -> Vec<SearchEngine> {
        let all = self.list_all_engines();
        ids.iter()
            .filter_map(|id| {
                let found = all.iter().find(|e| &e.id == id).cloned();
                if found.is_none() {
                    debug!("Engine '{}' is no longer in the catalog", id);
                }
                found
            })
            .collect()
    }

    /// Ids of enabled engines. Defaults to a built-in subset on first use.
    pub fn enabled_engine_ids(&self) -> Vec<String> {
        read_json(self.storage.as_ref(), ENABLED_ENGINES_KEY).unwrap_or_else(|| {
            engines::DEFAULT_ENABLED
                .iter()
                .map(|id| id.to_string())
                .collect()
        })
    }

    /// Enabled engines, in catalog order.
    pub fn enabled_engines(&self) -> Vec<SearchEngine> {
        let enabled = self.enabled_engine_ids();
        self.list_all_engines()
            .into_iter()
            .filter(|e| enabled.contains(&e.id))
            .collect()
    }

    /// Adds a custom engine and returns it as stored.
    ///
    /// The id is trimmed and lowercased and the name trimmed before the
    /// duplicate check. The URL is normalized so an encoded query can be
    /// appended: without a `?` it gets `?q=`, otherwise a trailing `=` is
    /// ensured. The new engine is enabled and seeded with the generic
    /// configuration.
    pub fn add_engine(&self, engine: SearchEngine) -> Result<SearchEngine> {
        let id = normalize_id(&engine.id);
        let name = engine.name.trim().to_string();
        if id.is_empty() {
            return Err(DorkError::Validation("Engine ID is required".to_string()));
        }
        if name.is_empty() {
            return Err(DorkError::Validation("Engine name is required".to_string()));
        }
        if engine.url.trim().is_empty() {
            return Err(DorkError::Validation("Engine URL is required".to_string()));
        }

        let mut custom = self.custom_engines();
        if self.is_builtin(&id) || custom.iter().any(|e| e.id == id) {
            return Err(DorkError::DuplicateEngine(id));
        }

        let engine = SearchEngine {
            url: normalize_url(&engine.url),
            id,
            name,
            ..engine
        };
        custom.push(engine.clone());
        write_json(self.storage.as_ref(), CUSTOM_ENGINES_KEY, &custom)?;

        self.configs
            .update_configuration(&engine.id, EngineConfiguration::default())?;
        self.set_engine_enabled(&engine.id, true)?;

        info!("Added search engine '{}' ({})", engine.id, engine.url);
        Ok(engine)
    }

    /// Removes a custom engine with its enabled flag and configuration.
    ///
    /// Removing an id that is not in the custom list still cleans up any
    /// orphaned enabled flag or configuration.
    pub fn remove_engine(&self, id: &str) -> Result<()> {
        if self.is_builtin(id) {
            return Err(DorkError::BuiltinEngine(id.to_string()));
        }

        let mut custom = self.custom_engines();
        let before = custom.len();
        custom.retain(|e| e.id != id);
        if custom.len() != before {
            write_json(self.storage.as_ref(), CUSTOM_ENGINES_KEY, &custom)?;
        } else {
            warn!("Engine '{}' is not a custom engine, cleaning up leftovers only", id);
        }

        self.forget(&[id.to_string()])?;
        info!("Removed search engine '{}'", id);
        Ok(())
    }

    /// Replaces the custom engine list and returns how many were kept.
    ///
    /// Ids are normalized like [`EngineRegistry::add_engine`]. Entries with an
    /// empty id, an id of a built-in, or an id already seen earlier in the
    /// list are dropped. Custom engines missing from the new list lose their
    /// enabled flag and configuration.
    pub fn replace_custom_engines(&self, engines: Vec<SearchEngine>) -> Result<usize> {
        let previous = self.custom_engines();

        let mut kept: Vec<SearchEngine> = Vec::new();
        for engine in engines {
            let id = normalize_id(&engine.id);
            if id.is_empty() {
                warn!("Skipping engine '{}' without an id", engine.name);
            } else if self.is_builtin(&id) {
                warn!("Skipping engine '{}': clashes with a built-in", id);
            } else if kept.iter().any(|e| e.id == id) {
                warn!("Skipping duplicate engine '{}'", id);
            } else {
                kept.push(SearchEngine { id, ..engine });
            }
        }
        write_json(self.storage.as_ref(), CUSTOM_ENGINES_KEY, &kept)?;

        let dropped: Vec<String> = previous
            .into_iter()
            .map(|e| e.id)
            .filter(|id| !kept.iter().any(|e| &e.id == id))
            .collect();
        self.forget(&dropped)?;
        Ok(kept.len())
    }

    /// Drops `ids` from the enabled set and the configuration map.
    fn forget(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut enabled = self.enabled_engine_ids();
        let before = enabled.len();
        enabled.retain(|e| !ids.contains(e));
        if enabled.len() != before {
            write_json(self.storage.as_ref(), ENABLED_ENGINES_KEY, &enabled)?;
        }

        for id in ids {
            self.configs.remove_configuration(id)?;
        }
        Ok(())
    }

    /// Enables or disables an engine. Repeating the current state is a no-op.
    pub fn set_engine_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        if self.find(id).is_none() {
            return Err(DorkError::UnknownEngine(id.to_string()));
        }

        let mut ids = self.enabled_engine_ids();
        let present = ids.iter().any(|e| e == id);
        match (enabled, present) {
            (true, false) => ids.push(id.to_string()),
            (false, true) => ids.retain(|e| e != id),
            _ => return Ok(()),
        }

        write_json(self.storage.as_ref(), ENABLED_ENGINES_KEY, &ids)?;
        debug!("Engine '{}' enabled={}", id, enabled);
        Ok(())
    }
}

/// Engine ids are lowercase tokens without surrounding whitespace.
fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Makes `url` end in a query parameter assignment.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if !url.contains('?') {
        format!("{}?q=", url)
    } else if !url.ends_with('=') {
        format!("{}=", url)
    } else {
        url.to_string()
    }
}
