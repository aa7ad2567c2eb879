//! Export and import of all user data as one JSON document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::engine_config::ConfigurationMap;
use crate::history::{HistoryStore, SearchHistoryItem};
use crate::id::now_millis;
use crate::registry::EngineRegistry;
use crate::tags::{Tag, TagStore};
use crate::{DorkError, Result, SearchEngine};

/// Version written by [`export_app_data`].
pub const EXPORT_VERSION: &str = "1.1";

/// The exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub version: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub search_history: Vec<SearchHistoryItem>,
    pub tags: Vec<Tag>,
    pub engine_configs: ConfigurationMap,
    /// Absent in documents written before custom engines existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_engines: Option<Vec<SearchEngine>>,
}

/// What an import wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub version: Option<String>,
    pub history: usize,
    pub tags: usize,
    pub engine_configs: Option<usize>,
    pub custom_engines: Option<usize>,
}

/// Serializes history, tags, effective engine configurations and custom
/// engines as pretty JSON.
pub fn export_app_data(
    registry: &EngineRegistry,
    history: &HistoryStore,
    tags: &TagStore,
) -> Result<String> {
    let engines = registry.list_all_engines();
    let data = AppData {
        version: EXPORT_VERSION.to_string(),
        timestamp: now_millis(),
        search_history: history.list(),
        tags: tags.list(),
        engine_configs: registry
            .configurations()
            .effective(engines.iter().map(|e| e.id.as_str())),
        custom_engines: Some(registry.custom_engines()),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Imports a document produced by [`export_app_data`] (any version).
///
/// `searchHistory` and `tags` are required. Every present field is parsed
/// before anything is written, so a rejected document leaves storage
/// untouched. Fields are then written one key at a time.
pub fn import_app_data(
    json: &str,
    registry: &EngineRegistry,
    history: &HistoryStore,
    tags: &TagStore,
) -> Result<ImportSummary> {
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| DorkError::Import(format!("not valid JSON: {}", e)))?;
    let obj = doc
        .as_object()
        .ok_or_else(|| DorkError::Import("expected a JSON object".to_string()))?;

    let search_history: Vec<SearchHistoryItem> = required(obj, "searchHistory")?;
    let tag_list: Vec<Tag> = required(obj, "tags")?;
    let engine_configs: Option<ConfigurationMap> = optional(obj, "engineConfigs")?;
    let custom_engines: Option<Vec<SearchEngine>> = optional(obj, "customEngines")?;
    let version = obj.get("version").and_then(Value::as_str).map(str::to_string);

    let mut summary = ImportSummary {
        version,
        history: search_history.len(),
        tags: tag_list.len(),
        ..Default::default()
    };

    history.replace_all(&search_history)?;
    tags.replace_all(&tag_list)?;

    if let Some(configs) = engine_configs {
        registry.configurations().set_configurations(&configs)?;
        summary.engine_configs = Some(configs.len());
    }

    if let Some(engines) = custom_engines {
        summary.custom_engines = Some(registry.replace_custom_engines(engines)?);
    }

    info!(
        "Imported {} history items and {} tags",
        summary.history, summary.tags
    );
    Ok(summary)
}

fn required<T: DeserializeOwned>(obj: &serde_json::Map<String, Value>, key: &str) -> Result<T> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DorkError::Import(format!("missing '{}'", key))),
        Some(value) => parse_field(value, key),
    }
}

fn optional<T: DeserializeOwned>(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<T>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_field(value, key).map(Some),
    }
}

fn parse_field<T: DeserializeOwned>(value: &Value, key: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| DorkError::Import(format!("invalid '{}': {}", key, e)))
}
