//! Process settings and the persisted theme preference.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::formatter::FormatterLimits;
use crate::storage::{read_json, write_json, Storage, THEME_KEY};
use crate::Result;

/// Directory name used under the platform data directory.
const APP_DIR: &str = "dorkforge";

/// Process-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the file-backed store.
    pub data_dir: PathBuf,
    /// Limits applied to formatter scripts.
    pub formatter: FormatterLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            formatter: FormatterLimits::default(),
        }
    }
}

impl Settings {
    /// Overrides the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Overrides the formatter operation budget.
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.formatter.max_operations = max_operations;
        self
    }
}

/// Platform data directory, or `./.dorkforge` when there is none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Persisted theme preference.
pub struct ThemeStore {
    storage: Arc<dyn Storage>,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The saved theme, or dark.
    pub fn get(&self) -> Theme {
        read_json(self.storage.as_ref(), THEME_KEY).unwrap_or_default()
    }

    pub fn set(&self, theme: Theme) -> Result<()> {
        write_json(self.storage.as_ref(), THEME_KEY, &theme)
    }

    /// Switches to the other theme and returns it.
    pub fn toggle(&self) -> Result<Theme> {
        let theme = self.get().toggled();
        self.set(theme)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.data_dir.ends_with("dorkforge") || settings.data_dir.ends_with(".dorkforge"));
        assert_eq!(settings.formatter, FormatterLimits::default());
    }

    #[test]
    fn test_settings_overrides() {
        let settings = Settings::default()
            .with_data_dir("/tmp/dorks")
            .with_max_operations(10);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/dorks"));
        assert_eq!(settings.formatter.max_operations, 10);
    }

    #[test]
    fn test_theme_default_and_toggle() {
        let themes = ThemeStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(themes.get(), Theme::Dark);
        assert_eq!(themes.toggle().unwrap(), Theme::Light);
        assert_eq!(themes.get(), Theme::Light);
        themes.set(Theme::Dark).unwrap();
        assert_eq!(themes.get(), Theme::Dark);
    }

    #[test]
    fn test_theme_serialization() {
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
    }
}
