//! Yandex search.
//!
//! Yandex scopes by host with `rhost:`, which takes the host name with its
//! labels reversed (`sub.example.com` → `rhost:com.example.sub.*`). The
//! default configuration turns advanced formatting on and ships a formatter
//! that performs the reversal. A domain written as `name.*` is a whole-site
//! pattern and maps to `site:name` instead.

use crate::{BuiltinEngine, EngineConfiguration, SearchEngine};

/// Include-domain formatter shipped with the Yandex configuration.
pub const YANDEX_INCLUDE_FORMATTER: &str = r#"
fn format(domain) {
    let cleaned = domain;
    if cleaned.starts_with("https://") {
        cleaned = cleaned.sub_string(8);
    } else if cleaned.starts_with("http://") {
        cleaned = cleaned.sub_string(7);
    }
    if cleaned.starts_with("www.") || cleaned.starts_with("web.") {
        cleaned = cleaned.sub_string(4);
    }
    if cleaned.starts_with("*.") {
        cleaned = cleaned.sub_string(2);
    }

    let parts = cleaned.split(".");
    let whole_site = parts[parts.len() - 1] == "*";
    if whole_site {
        parts.pop();
    } else {
        parts.reverse();
    }

    let joined = "";
    let i = 0;
    for part in parts {
        if i > 0 {
            joined += ".";
        }
        joined += part;
        i += 1;
    }

    if whole_site {
        "site:" + joined
    } else {
        "rhost:" + joined + ".*"
    }
}
"#;

/// Yandex search engine.
pub struct Yandex {
    engine: SearchEngine,
    configuration: EngineConfiguration,
}

impl Yandex {
    /// Creates the Yandex engine with the reversed-host include formatter.
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new("yandex", "Yandex", "https://yandex.com/search/?text=", "🌐"),
            configuration: EngineConfiguration::with_syntax("site:$domain", "", "mime:$type")
                .with_support(false, true)
                .with_include_formatter(YANDEX_INCLUDE_FORMATTER),
        }
    }
}

impl Default for Yandex {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinEngine for Yandex {
    fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }
}
