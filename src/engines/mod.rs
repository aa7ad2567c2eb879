//! Built-in search engines.

mod baidu;
mod bing;
mod duckduckgo;
mod github;
mod google;
mod startpage;
mod yandex;

pub use baidu::Baidu;
pub use bing::Bing;
pub use duckduckgo::DuckDuckGo;
pub use github::GitHub;
pub use google::Google;
pub use startpage::Startpage;
pub use yandex::{Yandex, YANDEX_INCLUDE_FORMATTER};

use crate::BuiltinEngine;

/// Engines enabled before the user has changed anything.
pub const DEFAULT_ENABLED: &[&str] = &["google", "duckduckgo", "bing"];

/// Returns every built-in engine, in catalog order.
pub fn builtin() -> Vec<Box<dyn BuiltinEngine>> {
    vec![
        Box::new(Google::new()),
        Box::new(DuckDuckGo::new()),
        Box::new(Bing::new()),
        Box::new(Yandex::new()),
        Box::new(Baidu::new()),
        Box::new(Startpage::new()),
        Box::new(GitHub::new()),
    ]
}
