use crate::errors::EditorError;
use crate::geometry::Dimensions;
use crate::style::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "mindmaps.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Creator drags shorter than this are treated as accidental
    #[serde(default = "default_min_creation_distance")]
    pub min_creation_distance: f64,

    /// Undo levels kept per document (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Viewport size of new documents
    #[serde(default)]
    pub default_dimensions: Dimensions,

    /// Caption of the root node in new documents
    #[serde(default = "default_root_caption")]
    pub root_caption: String,

    /// Branch color of the root node in new documents
    #[serde(default = "Color::black")]
    pub root_color: Color,
}

fn default_min_creation_distance() -> f64 {
    50.0
}

fn default_undo_levels() -> usize {
    100
}

fn default_root_caption() -> String {
    "Central Idea".to_string()
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a directory, falling back to defaults when the
    /// file does not exist
    pub fn load(dir: &Path) -> Result<Self, EditorError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_creation_distance: default_min_creation_distance(),
            undo_levels: default_undo_levels(),
            default_dimensions: Dimensions::default(),
            root_caption: default_root_caption(),
            root_color: Color::black(),
        }
    }
}
