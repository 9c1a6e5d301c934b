//! Loader configuration
//!
//! Every setting has a default matching the stock block layout, so an empty
//! JSON object (or no config at all) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::identifier::DEFAULT_IDENTIFIER_PREFIX;
use crate::runtime::render::EDIT_CONTEXT;
use crate::source::store::{RecordQuery, BLOCK_POST_TYPE, PUBLISHED_STATUS};

/// Settings for loading, registering and rendering blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Content type of stored block records
    pub post_type: String,
    /// Status a stored record needs to be loaded
    pub post_status: String,
    /// Block document looked up in every search root
    pub blocks_file: String,
    /// Directory holding block templates, relative to each search root
    pub template_dir: String,
    /// Extension of block template files
    pub template_extension: String,
    /// Prefix for registration identifiers that start with a digit
    pub identifier_prefix: String,
    /// `context` request parameter value that selects the editor preview
    pub edit_context: String,
    /// Name of the JS constant holding the block map in the editor
    pub editor_global: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            post_type: BLOCK_POST_TYPE.to_string(),
            post_status: PUBLISHED_STATUS.to_string(),
            blocks_file: "blocks/blocks.json".to_string(),
            template_dir: "blocks".to_string(),
            template_extension: "liquid".to_string(),
            identifier_prefix: DEFAULT_IDENTIFIER_PREFIX.to_string(),
            edit_context: EDIT_CONTEXT.to_string(),
            editor_global: "blockLabBlocks".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Query for the stored records this configuration loads
    pub fn record_query(&self) -> RecordQuery {
        RecordQuery::new(&self.post_type, &self.post_status)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
