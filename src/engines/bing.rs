//! Bing web search.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// Bing search engine.
pub struct Bing {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl Bing {
    /// Creates the Bing engine with its default configuration.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("bing", "Bing", "https://www.bing.com/search?q=", "🔎"),
            configuration: EngineConfiguration::with_syntax("site:$domain", "-site:$domain", "filetype:$type")
                .with_support(true, true),
        }
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for Bing {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
