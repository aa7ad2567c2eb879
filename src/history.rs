//! Search history records.
//!
//! The history is one persisted list, newest first. Every mutation reads the
//! full list, changes it and writes it back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::id::{generate_id, now_millis};
use crate::storage::{read_json, write_json, Storage, SEARCH_HISTORY_KEY};
use crate::{DorkQuery, Result};

/// Progress marker the user sets on a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    #[default]
    Pending,
    Complete,
}

impl std::str::FromStr for SearchStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "complete" | "completed" => Ok(Self::Complete),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// One dispatched (or drafted) search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItem {
    pub id: String,
    pub query: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Ids of the engines used. May reference engines deleted since.
    pub engines: Vec<String>,
    #[serde(default)]
    pub include_domains: Vec<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub status: SearchStatus,
    /// Tag ids. May reference tags deleted since.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub bookmarked: bool,
}

impl SearchHistoryItem {
    /// Creates a pending record for `request` sent to `engines`.
    ///
    /// Blank domain rows and an empty file type are not recorded.
    pub fn new(request: &DorkQuery, engines: Vec<String>) -> Self {
        Self {
            id: generate_id(),
            query: request.query.clone(),
            timestamp: now_millis(),
            engines,
            include_domains: request.included().into_iter().map(str::to_string).collect(),
            exclude_domains: request.excluded().into_iter().map(str::to_string).collect(),
            file_type: request.file_type().map(str::to_string),
            status: SearchStatus::Pending,
            tags: Vec::new(),
            notes: String::new(),
            bookmarked: false,
        }
    }

    /// Maps the record back to editable form fields.
    pub fn to_form_state(&self) -> FormState {
        FormState {
            query: self.query.clone(),
            engines: self.engines.clone(),
            include_domains: at_least_one_row(&self.include_domains),
            exclude_domains: at_least_one_row(&self.exclude_domains),
            file_type: self.file_type.clone().unwrap_or_default(),
        }
    }

    /// The record's request, for re-running it.
    pub fn to_query(&self) -> DorkQuery {
        DorkQuery {
            query: self.query.clone(),
            include_domains: self.include_domains.clone(),
            exclude_domains: self.exclude_domains.clone(),
            file_type: self.file_type.clone(),
        }
    }
}

/// Search form fields restored from a history record.
///
/// Domain lists always hold at least one (possibly blank) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub query: String,
    pub engines: Vec<String>,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub file_type: String,
}

fn at_least_one_row(domains: &[String]) -> Vec<String> {
    if domains.is_empty() {
        vec![String::new()]
    } else {
        domains.to_vec()
    }
}

/// Persisted search history.
pub struct HistoryStore {
    storage: Arc<dyn Storage>,
}

impl HistoryStore {
    /// Creates a history store over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// All records, newest first. Empty when nothing (or nothing valid) is stored.
    pub fn list(&self) -> Vec<SearchHistoryItem> {
        read_json(self.storage.as_ref(), SEARCH_HISTORY_KEY).unwrap_or_default()
    }

    /// Looks up one record.
    pub fn get(&self, id: &str) -> Option<SearchHistoryItem> {
        self.list().into_iter().find(|item| item.id == id)
    }

    /// Prepends `item`.
    pub fn save(&self, item: SearchHistoryItem) -> Result<()> {
        let mut history = self.list();
        debug!("Saving search '{}' to history", item.id);
        history.insert(0, item);
        self.write(&history)
    }

    /// Replaces the whole list.
    pub fn replace_all(&self, history: &[SearchHistoryItem]) -> Result<()> {
        self.write(history)
    }

    /// Sets the status of one record.
    pub fn update_status(&self, id: &str, status: SearchStatus) -> Result<()> {
        self.modify(id, |item| item.status = status)
    }

    /// Sets the tag ids of one record.
    pub fn update_tags(&self, id: &str, tags: Vec<String>) -> Result<()> {
        self.modify(id, move |item| item.tags = tags.clone())
    }

    /// Sets the notes of one record.
    pub fn update_notes(&self, id: &str, notes: &str) -> Result<()> {
        self.modify(id, |item| item.notes = notes.to_string())
    }

    /// Flips the bookmark flag of one record.
    pub fn toggle_bookmark(&self, id: &str) -> Result<()> {
        self.modify(id, |item| item.bookmarked = !item.bookmarked)
    }

    /// Removes one record.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut history = self.list();
        history.retain(|item| item.id != id);
        self.write(&history)
    }

    fn modify(&self, id: &str, change: impl Fn(&mut SearchHistoryItem)) -> Result<()> {
        let history: Vec<SearchHistoryItem> = self
            .list()
            .into_iter()
            .map(|mut item| {
                if item.id == id {
                    change(&mut item);
                }
                item
            })
            .collect();
        self.write(&history)
    }

    fn write(&self, history: &[SearchHistoryItem]) -> Result<()> {
        write_json(self.storage.as_ref(), SEARCH_HISTORY_KEY, history)
    }
}
