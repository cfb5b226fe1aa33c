use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for a [`crate::StreamRenderer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Use the bundled in-memory component cache.
    pub cache_enabled: bool,
    /// Maximum number of cached component renders.
    pub cache_capacity: usize,
    /// Attribute that marks the root element as server rendered. `None`
    /// disables the marker.
    pub server_rendered_attr: Option<String>,
    /// Tags rendered without an end tag besides the HTML void elements.
    pub extra_unary_tags: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_capacity: 1000,
            server_rendered_attr: Some("data-server-rendered".to_string()),
            extra_unary_tags: Vec::new(),
        }
    }
}

impl RenderOptions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse render options")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&json)
    }
}
