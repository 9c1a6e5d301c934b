//! Editor hand-off
//!
//! The editor script reads the merged block map from a JS constant declared
//! inline before the script runs. Script and stylesheet locations and the
//! cache-busting version are supplied by the host.

use serde::{Deserialize, Serialize};

/// Script and stylesheet locations supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorAssets {
    pub script_url: String,
    pub style_url: String,
    pub version: String,
}

/// Assets plus the serialized block map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorBundle {
    pub assets: EditorAssets,
    /// Name of the JS constant
    pub global: String,
    /// Serialized block map, embedded verbatim
    pub blocks_json: String,
}

impl EditorBundle {
    pub fn new(
        assets: EditorAssets,
        global: impl Into<String>,
        blocks_json: impl Into<String>,
    ) -> Self {
        Self {
            assets,
            global: global.into(),
            blocks_json: blocks_json.into(),
        }
    }

    /// Inline script declaring the block map constant
    pub fn inline_script(&self) -> String {
        format!("const {} = {}", self.global, self.blocks_json)
    }

    /// Script URL with the version appended for cache busting
    pub fn versioned_script_url(&self) -> String {
        versioned(&self.assets.script_url, &self.assets.version)
    }

    /// Stylesheet URL with the version appended for cache busting
    pub fn versioned_style_url(&self) -> String {
        versioned(&self.assets.style_url, &self.assets.version)
    }
}

fn versioned(url: &str, version: &str) -> String {
    if version.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}ver={version}")
}
