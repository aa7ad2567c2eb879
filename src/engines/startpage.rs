//! Startpage, a proxy in front of Google results.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// Startpage search engine.
pub struct Startpage {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl Startpage {
    /// Creates the Startpage engine with its default configuration.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("startpage", "Startpage", "https://www.startpage.com/do/search?q=", "🔒"),
            configuration: EngineConfiguration::with_syntax("site:$domain", "-site:$domain", "filetype:$type")
                .with_support(true, true),
        }
    }
}

impl Default for Startpage {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for Startpage {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
