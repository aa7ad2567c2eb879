//! User tags for organizing history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{read_json, write_json, Storage, TAGS_KEY};
use crate::Result;

/// Fixed tag palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    #[default]
    #[serde(alias = "bg-cyber-teal")]
    Teal,
    #[serde(alias = "bg-cyber-blue")]
    Blue,
    #[serde(alias = "bg-cyber-purple")]
    Purple,
    #[serde(alias = "bg-cyber-success")]
    Success,
    #[serde(alias = "bg-cyber-warning")]
    Warning,
    #[serde(alias = "bg-cyber-danger")]
    Danger,
}

impl TagColor {
    /// Every palette entry.
    pub const ALL: [TagColor; 6] = [
        TagColor::Teal,
        TagColor::Blue,
        TagColor::Purple,
        TagColor::Success,
        TagColor::Warning,
        TagColor::Danger,
    ];

    /// The token used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagColor::Teal => "teal",
            TagColor::Blue => "blue",
            TagColor::Purple => "purple",
            TagColor::Success => "success",
            TagColor::Warning => "warning",
            TagColor::Danger => "danger",
        }
    }
}

impl std::str::FromStr for TagColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        let token = token.strip_prefix("bg-cyber-").unwrap_or(&token);
        TagColor::ALL
            .into_iter()
            .find(|c| c.as_str() == token)
            .ok_or_else(|| format!("unknown tag color '{}'", s))
    }
}

/// A user-defined label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: TagColor,
}

impl Tag {
    /// Creates a tag.
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: TagColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
        }
    }
}

/// Tags shipped before the user creates any.
pub fn default_tags() -> Vec<Tag> {
    vec![
        Tag::new("osint", "OSINT", TagColor::Teal),
        Tag::new("security", "Security", TagColor::Purple),
        Tag::new("personal", "Personal", TagColor::Blue),
        Tag::new("work", "Work", TagColor::Success),
    ]
}

/// Persisted tag list.
pub struct TagStore {
    storage: Arc<dyn Storage>,
}

impl TagStore {
    /// Creates a tag store over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// All tags; the defaults when none (or nothing valid) is stored.
    pub fn list(&self) -> Vec<Tag> {
        read_json(self.storage.as_ref(), TAGS_KEY).unwrap_or_else(default_tags)
    }

    /// Inserts `tag`, or replaces the tag with the same id.
    pub fn save(&self, tag: Tag) -> Result<()> {
        let mut tags = self.list();
        match tags.iter_mut().find(|t| t.id == tag.id) {
            Some(existing) => *existing = tag,
            None => tags.push(tag),
        }
        self.replace_all(&tags)
    }

    /// Removes a tag. History items keep the dangling id.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut tags = self.list();
        tags.retain(|t| t.id != id);
        self.replace_all(&tags)
    }

    /// Replaces the whole list.
    pub fn replace_all(&self, tags: &[Tag]) -> Result<()> {
        write_json(self.storage.as_ref(), TAGS_KEY, tags)
    }

    /// Resolves tag ids, skipping ids whose tag was deleted.
    pub fn resolve(&self, ids: &[String]) -> Vec<Tag> {
        let tags = self.list();
        ids.iter()
            .filter_map(|id| tags.iter().find(|t| &t.id == id).cloned())
            .collect()
    }
}
