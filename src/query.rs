//! Dork request representation.

use serde::{Deserialize, Serialize};

/// A logical search request, independent of any engine's syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DorkQuery {
    /// The search terms.
    pub query: String,
    /// Domains to scope the search to (joined with OR).
    #[serde(default)]
    pub include_domains: Vec<String>,
    /// Domains to exclude (all applied).
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    /// Restrict results to this file type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl DorkQuery {
    /// Creates a new query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Adds one include domain.
    pub fn include(mut self, domain: impl Into<String>) -> Self {
        self.include_domains.push(domain.into());
        self
    }

    /// Adds one exclude domain.
    pub fn exclude(mut self, domain: impl Into<String>) -> Self {
        self.exclude_domains.push(domain.into());
        self
    }

    /// Replaces the include domains.
    pub fn with_include_domains(mut self, domains: Vec<String>) -> Self {
        self.include_domains = domains;
        self
    }

    /// Replaces the exclude domains.
    pub fn with_exclude_domains(mut self, domains: Vec<String>) -> Self {
        self.exclude_domains = domains;
        self
    }

    /// Sets the file type filter.
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Include domains with blank entries removed.
    pub fn included(&self) -> Vec<&str> {
        non_blank(&self.include_domains)
    }

    /// Exclude domains with blank entries removed.
    pub fn excluded(&self) -> Vec<&str> {
        non_blank(&self.exclude_domains)
    }

    /// The file type, if set and non-empty.
    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref().filter(|t| !t.is_empty())
    }
}

fn non_blank(domains: &[String]) -> Vec<&str> {
    domains
        .iter()
        .map(String::as_str)
        .filter(|d| !d.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dork_query_new() {
        let query = DorkQuery::new("test query");
        assert_eq!(query.query, "test query");
        assert!(query.include_domains.is_empty());
        assert!(query.exclude_domains.is_empty());
        assert!(query.file_type.is_none());
    }

    #[test]
    fn test_dork_query_builder_chain() {
        let query = DorkQuery::new("annual report")
            .include("example.com")
            .include("example.org")
            .exclude("spam.com")
            .with_file_type("pdf");

        assert_eq!(query.include_domains, vec!["example.com", "example.org"]);
        assert_eq!(query.exclude_domains, vec!["spam.com"]);
        assert_eq!(query.file_type(), Some("pdf"));
    }

    #[test]
    fn test_blank_domains_filtered() {
        let query = DorkQuery::new("q")
            .with_include_domains(vec!["".into(), "a.com".into(), "   ".into()])
            .with_exclude_domains(vec!["".into()]);
        assert_eq!(query.included(), vec!["a.com"]);
        assert!(query.excluded().is_empty());
    }

    #[test]
    fn test_empty_file_type_is_none() {
        let query = DorkQuery::new("q").with_file_type("");
        assert!(query.file_type().is_none());
    }

    #[test]
    fn test_dork_query_deserialization() {
        let json = r#"{"query":"test","includeDomains":["a.com"]}"#;
        let query: DorkQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.query, "test");
        assert_eq!(query.included(), vec!["a.com"]);
        assert!(query.exclude_domains.is_empty());
    }
}
