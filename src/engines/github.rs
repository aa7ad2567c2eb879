//! GitHub code search. "Domains" are `owner/repo` slugs and file types are languages.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// GitHub search engine.
pub struct GitHub {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl GitHub {
    /// Creates the GitHub engine with its default configuration.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("github", "GitHub", "https://github.com/search?q=", "📦"),
            configuration: EngineConfiguration::with_syntax("repo:$domain", "-repo:$domain", "language:$type")
                .with_support(true, true),
        }
    }
}

impl Default for GitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for GitHub {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
