//! Error types for the dork library.

use thiserror::Error;

use crate::formatter::FormatterError;

/// Result type alias for dork operations.
pub type Result<T> = std::result::Result<T, DorkError>;

/// Errors that can occur while managing engines, history and searches.
#[derive(Error, Debug)]
pub enum DorkError {
    /// A required field was missing or empty.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An engine with the same id already exists.
    #[error("An engine with id '{0}' already exists")]
    DuplicateEngine(String),

    /// Built-in engines cannot be removed.
    #[error("Engine '{0}' is built in and cannot be removed")]
    BuiltinEngine(String),

    /// The engine id is not in the catalog.
    #[error("Unknown engine '{0}'")]
    UnknownEngine(String),

    /// No usable engines were selected.
    #[error("No enabled search engines selected")]
    NoEngines,

    /// Backing store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Imported document was rejected.
    #[error("Import failed: {0}")]
    Import(String),

    /// Formatter source failed to compile or run.
    #[error("Formatter error: {0}")]
    Formatter(#[from] FormatterError),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Opening a browser tab failed.
    #[error("Failed to open URL: {0}")]
    Opener(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = DorkError::Validation("Engine ID is required".to_string());
        assert_eq!(err.to_string(), "Validation error: Engine ID is required");
    }

    #[test]
    fn test_error_display_duplicate_engine() {
        let err = DorkError::DuplicateEngine("google".to_string());
        assert_eq!(err.to_string(), "An engine with id 'google' already exists");
    }

    #[test]
    fn test_error_display_builtin_engine() {
        let err = DorkError::BuiltinEngine("bing".to_string());
        assert_eq!(err.to_string(), "Engine 'bing' is built in and cannot be removed");
    }

    #[test]
    fn test_error_display_no_engines() {
        let err = DorkError::NoEngines;
        assert_eq!(err.to_string(), "No enabled search engines selected");
    }

    #[test]
    fn test_error_display_import() {
        let err = DorkError::Import("missing searchHistory".to_string());
        assert_eq!(err.to_string(), "Import failed: missing searchHistory");
    }

    #[test]
    fn test_error_from_formatter() {
        let err: DorkError = FormatterError::NotAFunction.into();
        assert!(err.to_string().starts_with("Formatter error:"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let err: DorkError = json_err.into();
        assert!(matches!(err, DorkError::Serialization(_)));
    }

    #[test]
    fn test_error_debug() {
        let err = DorkError::NoEngines;
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("NoEngines"));
    }
}
