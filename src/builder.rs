//! Per-engine URL construction.

use tracing::debug;

use crate::engine_config::ConfigStore;
use crate::{DorkQuery, EngineConfiguration, FormatterEvaluator, SearchEngine};

/// Turns a [`DorkQuery`] into one encoded search URL per engine.
pub struct UrlBuilder<'a> {
    configs: &'a ConfigStore,
    formatter: &'a FormatterEvaluator,
}

impl<'a> UrlBuilder<'a> {
    /// Creates a builder reading configuration from `configs`.
    pub fn new(configs: &'a ConfigStore, formatter: &'a FormatterEvaluator) -> Self {
        Self { configs, formatter }
    }

    /// Builds the search URL for `engine`.
    pub fn build(&self, engine: &SearchEngine, request: &DorkQuery) -> String {
        let config = self.configs.get_configuration(&engine.id);
        let url = build_with_configuration(engine, &config, request, self.formatter);
        debug!("Built URL for '{}': {}", engine.id, url);
        url
    }
}

/// Assembles the query for `engine` under `config` and appends it to the
/// engine URL.
///
/// Steps, in order: trim the query, apply the query formatter, add include
/// terms joined with ` OR `, add exclude terms joined with a space, add the
/// file type term, percent-encode the result. An empty syntax template
/// switches its step off.
pub fn build_with_configuration(
    engine: &SearchEngine,
    config: &EngineConfiguration,
    request: &DorkQuery,
    formatter: &FormatterEvaluator,
) -> String {
    let mut query = request.query.trim().to_string();

    if let Some(source) = config.active_query_formatter() {
        query = formatter.evaluate(source, &query);
    }

    let included = request.included();
    if !included.is_empty() && !config.include_syntax.is_empty() {
        let terms: Vec<String> = included
            .iter()
            .map(|domain| match config.active_include_formatter() {
                Some(source) => formatter.evaluate(source, domain),
                None => config.include_term(domain),
            })
            .collect();
        query.push(' ');
        query.push_str(&terms.join(" OR "));
    }

    let excluded = request.excluded();
    if !excluded.is_empty() && config.supports_exclude_domains && !config.exclude_syntax.is_empty() {
        let terms: Vec<String> = excluded
            .iter()
            .map(|domain| match config.active_exclude_formatter() {
                Some(source) => formatter.evaluate(source, domain),
                None => config.exclude_term(domain),
            })
            .collect();
        query.push(' ');
        query.push_str(&terms.join(" "));
    }

    if let Some(file_type) = request.file_type() {
        if config.supports_filetype && !config.file_syntax.is_empty() {
            query.push(' ');
            query.push_str(&config.file_term(file_type));
        }
    }

    format!("{}{}", engine.url, urlencoding::encode(&query))
}
