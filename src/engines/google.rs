//! Google web search.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// Google search engine.
pub struct Google {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl Google {
    /// Creates the Google engine with its default configuration.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("google", "Google", "https://www.google.com/search?q=", "🔍"),
            configuration: EngineConfiguration::with_syntax("site:$domain", "-site:$domain", "filetype:$type")
                .with_support(true, true),
        }
    }
}

impl Default for Google {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for Google {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
