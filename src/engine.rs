//! Search engine identity and per-engine formatting rules.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with a domain in include/exclude syntax.
pub const DOMAIN_PLACEHOLDER: &str = "$domain";

/// Placeholder substituted with a file type in file syntax.
pub const TYPE_PLACEHOLDER: &str = "$type";

/// A search destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    /// Unique lowercase token (e.g., "google").
    pub id: String,
    /// Display label.
    pub name: String,
    /// Base URL ending in a query parameter assignment (`?q=`, `&text=`).
    pub url: String,
    /// Short display glyph.
    #[serde(default)]
    pub icon: String,
}

impl SearchEngine {
    /// Creates a new engine description.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            icon: icon.into(),
        }
    }
}

/// Formatting rules for one engine.
///
/// Syntax strings are templates: `$domain` / `$type` are replaced with the
/// literal value. An empty `include_syntax` switches include scoping off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfiguration {
    pub include_syntax: String,
    pub exclude_syntax: String,
    pub file_syntax: String,
    pub supports_exclude_domains: bool,
    pub supports_filetype: bool,
    /// Route domains (and optionally the query) through the formatter scripts.
    #[serde(default)]
    pub use_advanced_formatting: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_domain_formatter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_domain_formatter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_formatter: Option<String>,
}

impl Default for EngineConfiguration {
    /// The generic configuration used for engines without one of their own.
    fn default() -> Self {
        Self {
            include_syntax: "site:$domain".to_string(),
            exclude_syntax: "-site:$domain".to_string(),
            file_syntax: "filetype:$type".to_string(),
            supports_exclude_domains: true,
            supports_filetype: true,
            use_advanced_formatting: false,
            include_domain_formatter: None,
            exclude_domain_formatter: None,
            query_formatter: None,
        }
    }
}

impl EngineConfiguration {
    /// Creates a template-only configuration.
    pub fn with_syntax(
        include_syntax: impl Into<String>,
        exclude_syntax: impl Into<String>,
        file_syntax: impl Into<String>,
    ) -> Self {
        Self {
            include_syntax: include_syntax.into(),
            exclude_syntax: exclude_syntax.into(),
            file_syntax: file_syntax.into(),
            ..Default::default()
        }
    }

    /// Sets the capability flags.
    pub fn with_support(mut self, exclude_domains: bool, filetype: bool) -> Self {
        self.supports_exclude_domains = exclude_domains;
        self.supports_filetype = filetype;
        self
    }

    /// Enables advanced formatting with an include-domain formatter.
    pub fn with_include_formatter(mut self, source: impl Into<String>) -> Self {
        self.use_advanced_formatting = true;
        self.include_domain_formatter = Some(source.into());
        self
    }

    /// Enables advanced formatting with an exclude-domain formatter.
    pub fn with_exclude_formatter(mut self, source: impl Into<String>) -> Self {
        self.use_advanced_formatting = true;
        self.exclude_domain_formatter = Some(source.into());
        self
    }

    /// Enables advanced formatting with a whole-query formatter.
    pub fn with_query_formatter(mut self, source: impl Into<String>) -> Self {
        self.use_advanced_formatting = true;
        self.query_formatter = Some(source.into());
        self
    }

    /// Substitutes `domain` into the include syntax.
    pub fn include_term(&self, domain: &str) -> String {
        substitute(&self.include_syntax, DOMAIN_PLACEHOLDER, domain)
    }

    /// Substitutes `domain` into the exclude syntax.
    pub fn exclude_term(&self, domain: &str) -> String {
        substitute(&self.exclude_syntax, DOMAIN_PLACEHOLDER, domain)
    }

    /// Substitutes `file_type` into the file syntax.
    pub fn file_term(&self, file_type: &str) -> String {
        substitute(&self.file_syntax, TYPE_PLACEHOLDER, file_type)
    }

    /// Formatter source for include domains, when advanced formatting applies.
    pub fn active_include_formatter(&self) -> Option<&str> {
        self.active(&self.include_domain_formatter)
    }

    /// Formatter source for exclude domains, when advanced formatting applies.
    pub fn active_exclude_formatter(&self) -> Option<&str> {
        self.active(&self.exclude_domain_formatter)
    }

    /// Formatter source for the whole query, when advanced formatting applies.
    pub fn active_query_formatter(&self) -> Option<&str> {
        self.active(&self.query_formatter)
    }

    fn active<'a>(&self, source: &'a Option<String>) -> Option<&'a str> {
        if !self.use_advanced_formatting {
            return None;
        }
        source.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Replaces the first occurrence of `placeholder` with `value`.
fn substitute(template: &str, placeholder: &str, value: &str) -> String {
    template.replacen(placeholder, value, 1)
}

/// A compiled-in search engine with its default configuration.
pub trait BuiltinEngine: Send + Sync {
    /// Returns the engine identity.
    fn engine(&self) -> &SearchEngine;

    /// Returns the default formatting rules.
    fn configuration(&self) -> &EngineConfiguration;

    /// Returns the engine id.
    fn id(&self) -> &str {
        &self.engine().id
    }

    /// Returns the display name.
    fn name(&self) -> &str {
        &self.engine().name
    }
}
