//! Search orchestration.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::builder::UrlBuilder;
use crate::history::{HistoryStore, SearchHistoryItem};
use crate::opener::{PrintOpener, TabOpener};
use crate::registry::EngineRegistry;
use crate::settings::{Settings, ThemeStore};
use crate::storage::FileStorage;
use crate::tags::TagStore;
use crate::transfer::{export_app_data, import_app_data, ImportSummary};
use crate::{DorkError, DorkQuery, FormatterEvaluator, Result, SearchEngine, Storage};

/// A URL built for one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltUrl {
    pub engine_id: String,
    pub url: String,
}

/// Outcome of [`Dorker::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    /// Id of the history record saved for this search.
    pub history_id: String,
    pub urls: Vec<BuiltUrl>,
    /// Engine ids whose tab failed to open.
    pub failed: Vec<String>,
}

impl DispatchReport {
    /// Number of tabs handed off successfully.
    pub fn opened(&self) -> usize {
        self.urls.len() - self.failed.len()
    }
}

/// Dork builder that builds per-engine URLs, opens them and records history.
pub struct Dorker {
    registry: EngineRegistry,
    history: HistoryStore,
    tags: TagStore,
    themes: ThemeStore,
    formatter: FormatterEvaluator,
    opener: Box<dyn TabOpener>,
}

impl Dorker {
    /// Creates a dorker over `storage` with default formatter limits, printing
    /// URLs instead of opening them.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            registry: EngineRegistry::new(storage.clone()),
            history: HistoryStore::new(storage.clone()),
            tags: TagStore::new(storage.clone()),
            themes: ThemeStore::new(storage),
            formatter: FormatterEvaluator::new(),
            opener: Box::new(PrintOpener),
        }
    }

    /// Opens the file-backed store under `settings.data_dir`.
    pub fn open(settings: &Settings) -> Result<Self> {
        let storage = FileStorage::open(&settings.data_dir)?;
        debug!("Using data directory {}", settings.data_dir.display());
        Ok(Self::new(Arc::new(storage)).with_formatter(FormatterEvaluator::with_limits(
            &settings.formatter,
        )))
    }

    /// Sets the tab opener.
    pub fn with_opener(mut self, opener: impl TabOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    /// Sets the formatter evaluator.
    pub fn with_formatter(mut self, formatter: FormatterEvaluator) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }

    pub fn formatter(&self) -> &FormatterEvaluator {
        &self.formatter
    }

    /// Builds one URL per selected engine without opening anything.
    ///
    /// An empty `engine_ids` selects every enabled engine. Ids that are
    /// unknown or disabled are skipped.
    pub fn preview(&self, query: &DorkQuery, engine_ids: &[String]) -> Result<Vec<BuiltUrl>> {
        if query.query.trim().is_empty() {
            return Err(DorkError::Validation("Query cannot be empty".into()));
        }

        let enabled = self.registry.enabled_engines();
        let selected: Vec<SearchEngine> = if engine_ids.is_empty() {
            enabled
        } else {
            let mut selected = Vec::new();
            for id in engine_ids {
                if selected.iter().any(|e: &SearchEngine| &e.id == id) {
                    continue;
                }
                match enabled.iter().find(|e| &e.id == id) {
                    Some(engine) => selected.push(engine.clone()),
                    None if self.registry.find(id).is_some() => {
                        warn!("Engine '{}' is disabled, skipping", id)
                    }
                    None => warn!("Unknown engine '{}', skipping", id),
                }
            }
            selected
        };

        if selected.is_empty() {
            return Err(DorkError::NoEngines);
        }

        let builder = UrlBuilder::new(self.registry.configurations(), &self.formatter);
        Ok(selected
            .iter()
            .map(|engine| BuiltUrl {
                engine_id: engine.id.clone(),
                url: builder.build(engine, query),
            })
            .collect())
    }

    /// Builds and opens one tab per selected engine, then saves a pending
    /// history record naming the engines used.
    ///
    /// Tabs are opened in order. A failed tab is logged and reported, it
    /// does not stop the others.
    pub fn dispatch(&self, query: &DorkQuery, engine_ids: &[String]) -> Result<DispatchReport> {
        let urls = self.preview(query, engine_ids)?;
        debug!("Opening {} tabs", urls.len());

        let mut failed = Vec::new();
        for built in &urls {
            if let Err(e) = self.opener.open(&built.url) {
                warn!("Failed to open tab for {}: {}", built.engine_id, e);
                failed.push(built.engine_id.clone());
            }
        }

        let engines = urls.iter().map(|u| u.engine_id.clone()).collect();
        let item = SearchHistoryItem::new(query, engines);
        let history_id = item.id.clone();
        self.history.save(item)?;

        info!(
            "Dispatched '{}' to {} engines ({} failed)",
            query.query.trim(),
            urls.len(),
            failed.len()
        );
        Ok(DispatchReport {
            history_id,
            urls,
            failed,
        })
    }

    /// Dispatches a history record's search again to its engines.
    ///
    /// Engines removed or disabled since are skipped; a new record is saved.
    pub fn rerun(&self, history_id: &str) -> Result<DispatchReport> {
        let item = self
            .history
            .get(history_id)
            .ok_or_else(|| DorkError::Validation(format!("No history item '{}'", history_id)))?;
        self.dispatch(&item.to_query(), &item.engines)
    }

    /// Exports all user data as JSON.
    pub fn export(&self) -> Result<String> {
        export_app_data(&self.registry, &self.history, &self.tags)
    }

    /// Imports a document produced by [`Dorker::export`].
    pub fn import(&self, json: &str) -> Result<ImportSummary> {
        import_app_data(json, &self.registry, &self.history, &self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SearchStatus;
    use crate::storage::MemoryStorage;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingOpener {
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingOpener {
        fn urls(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl TabOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    /// Fails for URLs containing the given marker.
    struct FailingOpener {
        marker: &'static str,
    }

    impl TabOpener for FailingOpener {
        fn open(&self, url: &str) -> Result<()> {
            if url.contains(self.marker) {
                Err(DorkError::Opener("launcher crashed".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn dorker() -> (Dorker, RecordingOpener) {
        let opener = RecordingOpener::default();
        let dorker = Dorker::new(Arc::new(MemoryStorage::new())).with_opener(opener.clone());
        (dorker, opener)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_preview_empty_query() {
        let (dorker, _) = dorker();
        let result = dorker.preview(&DorkQuery::new("  \t"), &[]);
        assert!(matches!(result, Err(DorkError::Validation(_))));
    }

    #[test]
    fn test_preview_defaults_to_enabled_engines() {
        let (dorker, _) = dorker();
        let urls = dorker.preview(&DorkQuery::new("test"), &[]).unwrap();
        let engines: Vec<_> = urls.iter().map(|u| u.engine_id.as_str()).collect();
        assert_eq!(engines, vec!["google", "duckduckgo", "bing"]);
        assert_eq!(urls[0].url, "https://www.google.com/search?q=test");
    }

    #[test]
    fn test_preview_keeps_selection_order() {
        let (dorker, _) = dorker();
        let urls = dorker
            .preview(&DorkQuery::new("x"), &ids(&["bing", "google", "bing"]))
            .unwrap();
        let engines: Vec<_> = urls.iter().map(|u| u.engine_id.as_str()).collect();
        assert_eq!(engines, vec!["bing", "google"]);
    }

    #[test]
    fn test_preview_skips_disabled_and_unknown() {
        let (dorker, _) = dorker();
        let urls = dorker
            .preview(&DorkQuery::new("x"), &ids(&["yandex", "nope", "google"]))
            .unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].engine_id, "google");
    }

    #[test]
    fn test_preview_no_engines() {
        let (dorker, _) = dorker();
        let result = dorker.preview(&DorkQuery::new("x"), &ids(&["yandex"]));
        assert!(matches!(result, Err(DorkError::NoEngines)));

        for id in ["google", "duckduckgo", "bing"] {
            dorker.registry().set_engine_enabled(id, false).unwrap();
        }
        let result = dorker.preview(&DorkQuery::new("x"), &[]);
        assert!(matches!(result, Err(DorkError::NoEngines)));
    }

    #[test]
    fn test_preview_applies_configuration() {
        let (dorker, _) = dorker();
        dorker.registry().set_engine_enabled("yandex", true).unwrap();
        let query = DorkQuery::new("login").include("example.com");
        let urls = dorker.preview(&query, &ids(&["yandex"])).unwrap();
        let decoded = urlencoding::decode(&urls[0].url).unwrap().into_owned();
        assert!(decoded.ends_with("login rhost:com.example.*"), "{}", decoded);
    }

    #[test]
    fn test_dispatch_opens_and_records() {
        let (dorker, opener) = dorker();
        let query = DorkQuery::new("admin").include("example.com").with_file_type("pdf");
        let report = dorker.dispatch(&query, &ids(&["google", "bing"])).unwrap();

        assert_eq!(report.opened(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(
            opener.urls(),
            report.urls.iter().map(|u| u.url.clone()).collect::<Vec<_>>()
        );

        let history = dorker.history().list();
        assert_eq!(history.len(), 1);
        let item = &history[0];
        assert_eq!(item.id, report.history_id);
        assert_eq!(item.engines, ids(&["google", "bing"]));
        assert_eq!(item.status, SearchStatus::Pending);
        assert_eq!(item.file_type.as_deref(), Some("pdf"));
    }

    #[test]
    fn test_dispatch_records_only_used_engines() {
        let (dorker, _) = dorker();
        let report = dorker
            .dispatch(&DorkQuery::new("x"), &ids(&["google", "ghost"]))
            .unwrap();
        assert_eq!(report.urls.len(), 1);
        assert_eq!(dorker.history().list()[0].engines, ids(&["google"]));
    }

    #[test]
    fn test_dispatch_tolerates_open_failure() {
        let dorker = Dorker::new(Arc::new(MemoryStorage::new()))
            .with_opener(FailingOpener { marker: "bing.com" });
        let report = dorker.dispatch(&DorkQuery::new("x"), &[]).unwrap();
        assert_eq!(report.urls.len(), 3);
        assert_eq!(report.failed, ids(&["bing"]));
        assert_eq!(report.opened(), 2);
        assert_eq!(dorker.history().list().len(), 1);
    }

    #[test]
    fn test_dispatch_empty_query_saves_nothing() {
        let (dorker, opener) = dorker();
        assert!(dorker.dispatch(&DorkQuery::new(""), &[]).is_err());
        assert!(opener.urls().is_empty());
        assert!(dorker.history().list().is_empty());
    }

    #[test]
    fn test_dispatch_custom_engine() {
        let (dorker, opener) = dorker();
        dorker
            .registry()
            .add_engine(SearchEngine::new("ecosia", "Ecosia", "https://www.ecosia.org/search", ""))
            .unwrap();
        dorker
            .dispatch(&DorkQuery::new("a b"), &ids(&["ecosia"]))
            .unwrap();
        assert_eq!(opener.urls(), vec!["https://www.ecosia.org/search?q=a%20b"]);
    }

    #[test]
    fn test_rerun() {
        let (dorker, opener) = dorker();
        let first = dorker
            .dispatch(&DorkQuery::new("x").exclude("a.com"), &ids(&["duckduckgo"]))
            .unwrap();
        let second = dorker.rerun(&first.history_id).unwrap();
        assert_eq!(first.urls, second.urls);
        assert_ne!(first.history_id, second.history_id);
        assert_eq!(opener.urls().len(), 2);
        assert_eq!(dorker.history().list().len(), 2);

        assert!(matches!(dorker.rerun("missing"), Err(DorkError::Validation(_))));
    }

    #[test]
    fn test_export_import_round_trip() {
        let (source, _) = dorker();
        source.dispatch(&DorkQuery::new("x"), &[]).unwrap();
        let json = source.export().unwrap();

        let (target, _) = dorker();
        let summary = target.import(&json).unwrap();
        assert_eq!(summary.history, 1);
        assert_eq!(target.history().list(), source.history().list());
    }
}
