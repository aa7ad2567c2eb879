//! End-to-end tests against the file-backed store.
//!
//! Each test opens a fresh data directory, drives the public API the way the
//! CLI does, then reopens the directory to check what was persisted.

use std::sync::{Arc, Mutex};

use dorkforge::{
    opener::TabOpener,
    storage::{
        FileStorage, NotifyingStorage, ENABLED_ENGINES_KEY, ENGINE_CONFIGS_KEY, SEARCH_HISTORY_KEY,
    },
    DorkError, DorkQuery, Dorker, EngineConfiguration, SearchEngine, SearchStatus, Settings, Storage,
    Tag, TagColor,
};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
}

impl TabOpener for RecordingOpener {
    fn open(&self, url: &str) -> dorkforge::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Helper to open a dorker on `dir`
fn open(dir: &TempDir) -> Dorker {
    Dorker::open(&Settings::default().with_data_dir(dir.path())).unwrap()
}

fn decoded_query(url: &str, engine: &SearchEngine) -> String {
    let encoded = url
        .strip_prefix(engine.url.as_str())
        .unwrap_or_else(|| panic!("{} does not start with {}", url, engine.url));
    urlencoding::decode(encoded).unwrap().into_owned()
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

mod url_tests {
    use super::*;

    #[test]
    fn test_filetype_term_follows_capability() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        let registry = dorker.registry();
        for engine in registry.list_all_engines() {
            registry.set_engine_enabled(&engine.id, true).unwrap();
        }

        let with_type = DorkQuery::new("report").with_file_type("pdf");
        for built in dorker.preview(&with_type, &[]).unwrap() {
            let engine = registry.find(&built.engine_id).unwrap();
            let config = registry.configurations().get_configuration(&engine.id);
            let query = decoded_query(&built.url, &engine);
            let term = config.file_term("pdf");
            if config.supports_filetype {
                assert!(query.ends_with(&term), "{}: {}", engine.id, query);
            } else {
                assert_eq!(query, "report", "{}", engine.id);
            }
        }

        for built in dorker.preview(&DorkQuery::new("report"), &[]).unwrap() {
            let engine = registry.find(&built.engine_id).unwrap();
            assert_eq!(decoded_query(&built.url, &engine), "report");
        }
    }

    #[test]
    fn test_filetype_off_for_custom_engine() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        let engine = dorker
            .registry()
            .add_engine(SearchEngine::new("mojeek", "Mojeek", "https://www.mojeek.com/search", ""))
            .unwrap();
        let config = EngineConfiguration::default().with_support(true, false);
        dorker
            .registry()
            .configurations()
            .update_configuration("mojeek", config)
            .unwrap();

        let query = DorkQuery::new("x").with_file_type("pdf");
        let urls = dorker.preview(&query, &ids(&["mojeek"])).unwrap();
        assert_eq!(decoded_query(&urls[0].url, &engine), "x");
    }

    #[test]
    fn test_joiners_on_multiple_domains() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        let query = DorkQuery::new("index of")
            .include("a.com")
            .include("b.org")
            .exclude("c.net")
            .exclude("d.io");
        let urls = dorker.preview(&query, &ids(&["google"])).unwrap();
        let google = dorker.registry().find("google").unwrap();
        assert_eq!(
            decoded_query(&urls[0].url, &google),
            "index of site:a.com OR site:b.org -site:c.net -site:d.io"
        );
    }

    #[test]
    fn test_throwing_formatter_keeps_input() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        let config = EngineConfiguration::default()
            .with_include_formatter(r#"fn format(domain) { throw "boom"; }"#);
        dorker
            .registry()
            .configurations()
            .update_configuration("google", config)
            .unwrap();

        let urls = dorker
            .preview(&DorkQuery::new("q").include("example.com"), &ids(&["google"]))
            .unwrap();
        let google = dorker.registry().find("google").unwrap();
        assert_eq!(decoded_query(&urls[0].url, &google), "q example.com");
    }

    #[test]
    fn test_runaway_formatter_is_bounded() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default()
            .with_data_dir(dir.path())
            .with_max_operations(1_000);
        let dorker = Dorker::open(&settings).unwrap();
        let config = EngineConfiguration::default()
            .with_query_formatter("|q| { loop { } }");
        dorker
            .registry()
            .configurations()
            .update_configuration("bing", config)
            .unwrap();

        let urls = dorker.preview(&DorkQuery::new("q"), &ids(&["bing"])).unwrap();
        assert_eq!(urls[0].url, "https://www.bing.com/search?q=q");
    }

    #[test]
    fn test_yandex_table() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        dorker.registry().set_engine_enabled("yandex", true).unwrap();
        let yandex = dorker.registry().find("yandex").unwrap();

        let table = [
            ("example.com", "rhost:com.example.*"),
            ("www.example.com", "rhost:com.example.*"),
            ("*.example.com", "rhost:com.example.*"),
            ("sub.example.com", "rhost:com.example.sub.*"),
            ("example.*", "site:example"),
            ("website.co.uk.*", "site:website.co.uk"),
        ];
        for (domain, expected) in table {
            let urls = dorker
                .preview(&DorkQuery::new("q").include(domain), &ids(&["yandex"]))
                .unwrap();
            assert_eq!(
                decoded_query(&urls[0].url, &yandex),
                format!("q {}", expected),
                "{}",
                domain
            );
        }
    }
}

mod engine_tests {
    use super::*;

    #[test]
    fn test_enable_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        let registry = dorker.registry();

        registry.set_engine_enabled("google", true).unwrap();
        registry.set_engine_enabled("google", true).unwrap();
        let enabled = registry.enabled_engine_ids();
        assert_eq!(enabled.iter().filter(|id| *id == "google").count(), 1);

        registry.set_engine_enabled("yandex", false).unwrap();
        assert_eq!(registry.enabled_engine_ids(), enabled);
    }

    #[test]
    fn test_remove_custom_engine_cascades() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        dorker
            .registry()
            .add_engine(SearchEngine::new("ecosia", "Ecosia", "https://www.ecosia.org/search?q", ""))
            .unwrap();
        assert!(dorker.registry().enabled_engine_ids().contains(&"ecosia".to_string()));
        dorker.registry().remove_engine("ecosia").unwrap();

        // Reopen so only what reached disk is visible.
        let reopened = open(&dir);
        let registry = reopened.registry();
        assert!(registry.find("ecosia").is_none());
        assert!(!registry.enabled_engine_ids().contains(&"ecosia".to_string()));
        assert!(!registry.configurations().persisted().contains_key("ecosia"));
    }

    #[test]
    fn test_builtin_engines_cannot_be_removed() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        assert!(matches!(
            dorker.registry().remove_engine("google"),
            Err(DorkError::BuiltinEngine(_))
        ));
    }

    #[test]
    fn test_invalid_engine_leaves_no_state() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        let result = dorker
            .registry()
            .add_engine(SearchEngine::new("x", "", "https://x.example/?q=", ""));
        assert!(matches!(result, Err(DorkError::Validation(_))));

        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.get(ENABLED_ENGINES_KEY).unwrap().is_none());
        assert!(storage.get(ENGINE_CONFIGS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(format!("{}.json", ENABLED_ENGINES_KEY)), "{not json").unwrap();
        let dorker = open(&dir);
        assert_eq!(
            dorker.registry().enabled_engine_ids(),
            ids(&["google", "duckduckgo", "bing"])
        );
        assert_eq!(dorker.tags().list().len(), 4);
        assert!(dorker.history().list().is_empty());
    }
}

mod history_tests {
    use super::*;

    #[test]
    fn test_dispatch_then_annotate() {
        let dir = TempDir::new().unwrap();
        let opener = RecordingOpener::default();
        let dorker = open(&dir).with_opener(opener.clone());

        let report = dorker
            .dispatch(&DorkQuery::new("password").include("example.com"), &[])
            .unwrap();
        assert_eq!(opener.opened.lock().unwrap().len(), 3);

        let history = dorker.history();
        history.update_status(&report.history_id, SearchStatus::Complete).unwrap();
        history.update_tags(&report.history_id, ids(&["osint"])).unwrap();
        history.update_notes(&report.history_id, "nothing found").unwrap();
        history.toggle_bookmark(&report.history_id).unwrap();

        let reopened = open(&dir);
        let item = reopened.history().get(&report.history_id).unwrap();
        assert_eq!(item.status, SearchStatus::Complete);
        assert_eq!(item.tags, ids(&["osint"]));
        assert_eq!(item.notes, "nothing found");
        assert!(item.bookmarked);
        assert_eq!(reopened.tags().resolve(&item.tags)[0].name, "OSINT");
    }

    #[test]
    fn test_form_state_round_trip() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir).with_opener(RecordingOpener::default());
        let bare = dorker.dispatch(&DorkQuery::new("a"), &[]).unwrap();
        let scoped = dorker
            .dispatch(
                &DorkQuery::new("b").include("x.com").exclude("y.com"),
                &ids(&["google"]),
            )
            .unwrap();

        let form = dorker.history().get(&bare.history_id).unwrap().to_form_state();
        assert_eq!(form.include_domains, vec![String::new()]);
        assert_eq!(form.exclude_domains, vec![String::new()]);
        assert_eq!(form.file_type, "");

        let form = dorker.history().get(&scoped.history_id).unwrap().to_form_state();
        assert_eq!(form.include_domains, ids(&["x.com"]));
        assert_eq!(form.exclude_domains, ids(&["y.com"]));
        assert_eq!(form.engines, ids(&["google"]));
    }

    #[test]
    fn test_history_is_newest_first() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir).with_opener(RecordingOpener::default());
        let first = dorker.dispatch(&DorkQuery::new("first"), &[]).unwrap();
        let second = dorker.dispatch(&DorkQuery::new("second"), &[]).unwrap();

        let list = dorker.history().list();
        assert_eq!(list[0].id, second.history_id);
        assert_eq!(list[1].id, first.history_id);

        dorker.history().delete(&second.history_id).unwrap();
        assert_eq!(open(&dir).history().list().len(), 1);
    }
}

mod transfer_tests {
    use super::*;

    #[test]
    fn test_export_import_across_directories() {
        let source_dir = TempDir::new().unwrap();
        let source = open(&source_dir).with_opener(RecordingOpener::default());
        source
            .registry()
            .add_engine(SearchEngine::new("ecosia", "Ecosia", "https://www.ecosia.org/search", ""))
            .unwrap();
        source
            .tags()
            .save(Tag::new("leaks", "Leaks", TagColor::Danger))
            .unwrap();
        source.dispatch(&DorkQuery::new("dump"), &ids(&["ecosia"])).unwrap();
        let json = source.export().unwrap();

        let target_dir = TempDir::new().unwrap();
        let target = open(&target_dir);
        let summary = target.import(&json).unwrap();
        assert_eq!(summary.history, 1);
        assert_eq!(summary.tags, 5);
        assert_eq!(summary.custom_engines, Some(1));

        let reopened = open(&target_dir);
        assert_eq!(reopened.history().list(), source.history().list());
        assert!(reopened.tags().list().iter().any(|t| t.id == "leaks"));
        assert!(reopened.registry().find("ecosia").is_some());
    }

    #[test]
    fn test_rejected_import_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let dorker = open(&dir);
        assert!(dorker.import(r#"{"tags": []}"#).is_err());
        assert!(dorker.import("not json").is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

#[test]
fn test_change_notifications() {
    let dir = TempDir::new().unwrap();
    let changed = Arc::new(Mutex::new(Vec::new()));
    let storage = NotifyingStorage::new(FileStorage::open(dir.path()).unwrap());
    let sink = changed.clone();
    storage
        .subscribe(move |key| sink.lock().unwrap().push(key.to_string()))
        .unwrap();

    let dorker = Dorker::new(Arc::new(storage)).with_opener(RecordingOpener::default());
    dorker.registry().set_engine_enabled("github", true).unwrap();
    dorker.dispatch(&DorkQuery::new("x"), &ids(&["github"])).unwrap();

    let changed = changed.lock().unwrap();
    assert_eq!(*changed, vec![ENABLED_ENGINES_KEY, SEARCH_HISTORY_KEY]);
}
