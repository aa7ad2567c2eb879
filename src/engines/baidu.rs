//! Baidu (百度). Has no domain exclusion operator.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// Baidu search engine.
pub struct Baidu {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl Baidu {
    /// Creates the Baidu engine with its default configuration.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("baidu", "Baidu", "https://www.baidu.com/s?wd=", "🇨🇳"),
            configuration: EngineConfiguration::with_syntax("site:$domain", "", "filetype:$type")
                .with_support(false, true),
        }
    }
}

impl Default for Baidu {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for Baidu {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
