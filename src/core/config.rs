//! Persisted application state

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{OrganizerError, Result};

/// Default title for categories created without one
pub const DEFAULT_CATEGORY_TITLE: &str = "New category";

/// Root of the persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppConfig {
    /// Main window left edge
    pub main_x: f32,
    /// Main window top edge
    pub main_y: f32,
    /// Calendar notes keyed by `yyyy-MM-dd`
    pub calendar_notes: BTreeMap<String, String>,
    /// One entry per category window
    pub categories: Vec<CategoryData>,
}

/// Persisted state of a single category window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CategoryData {
    pub id: String,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Basenames of the files this category owns
    pub file_names: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            main_x: 100.0,
            main_y: 100.0,
            calendar_notes: BTreeMap::new(),
            categories: Vec::new(),
        }
    }
}

impl Default for CategoryData {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_CATEGORY_TITLE.to_string(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            file_names: Vec::new(),
        }
    }
}

impl CategoryData {
    /// Create an empty category with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl AppConfig {
    /// Load configuration, discarding anything unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Discarding corrupt config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OrganizerError::io("failed to create", parent, e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| OrganizerError::io("failed to write", path, e))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}
