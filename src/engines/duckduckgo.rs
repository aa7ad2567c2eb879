//! DuckDuckGo, which accepts Google-style operators.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// DuckDuckGo search engine.
pub struct DuckDuckGo {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl DuckDuckGo {
    /// Creates the DuckDuckGo engine with its default configuration.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("duckduckgo", "DuckDuckGo", "https://duckduckgo.com/?q=", "🦆"),
            configuration: EngineConfiguration::with_syntax("site:$domain", "-site:$domain", "filetype:$type")
                .with_support(true, true),
        }
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for DuckDuckGo {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
