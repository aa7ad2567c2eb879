//! # dorkforge
//!
//! A search dork builder. One query, with optional domain restrictions and a
//! file type filter, is rewritten into the operator syntax of each selected
//! search engine and opened as one browser tab per engine.
//!
//! - Built-in and user-defined engines with per-engine operator templates
//! - Sandboxed formatter scripts for engines whose syntax templates can't express
//! - Persistent search history with status, tags, notes and bookmarks
//! - JSON export and import of all user data
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dorkforge::{storage::MemoryStorage, DorkQuery, Dorker};
//!
//! fn main() -> anyhow::Result<()> {
//!     let dorker = Dorker::new(Arc::new(MemoryStorage::new()));
//!
//!     let query = DorkQuery::new("admin login")
//!         .include("example.com")
//!         .with_file_type("pdf");
//!     for built in dorker.preview(&query, &[])? {
//!         println!("{}: {}", built.engine_id, built.url);
//!     }
//!     Ok(())
//! }
//! ```

mod engine;
mod error;
mod query;
mod search;

pub mod builder;
pub mod engine_config;
pub mod engines;
pub mod formatter;
pub mod history;
pub mod id;
pub mod opener;
pub mod registry;
pub mod settings;
pub mod storage;
pub mod tags;
pub mod transfer;

pub use engine::{BuiltinEngine, EngineConfiguration, SearchEngine, DOMAIN_PLACEHOLDER, TYPE_PLACEHOLDER};
pub use error::{DorkError, Result};
pub use formatter::{FormatterError, FormatterEvaluator, FormatterLimits};
pub use history::{SearchHistoryItem, SearchStatus};
pub use query::DorkQuery;
pub use registry::EngineRegistry;
pub use search::{BuiltUrl, DispatchReport, Dorker};
pub use settings::{Settings, Theme};
pub use storage::Storage;
pub use tags::{Tag, TagColor};
