//! Block sources and merging
//!
//! Block definitions come from bundled JSON files and from stored content
//! records. Each source is decoded on its own; a source that cannot be read or
//! does not decode into a block map is skipped whole, so one bad source never
//! takes the other blocks down with it. Sources are merged in order and a later
//! block replaces an earlier block with the same key.

pub mod locator;
pub mod store;

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use crate::core::block::{BlockDefinition, BlockMap};

pub use locator::TemplateLocator;
pub use store::{ContentRecord, ContentStore, MemoryContentStore, RecordQuery};

/// One origin of block definitions
#[derive(Debug, Clone)]
pub enum BlockSource {
    /// A JSON document on the local filesystem
    File(PathBuf),
    /// A stored content record whose body is a JSON document
    Record(ContentRecord),
    /// A JSON document already in memory
    Inline { origin: String, json: String },
}

impl BlockSource {
    /// Human-readable origin used in logs
    pub fn origin(&self) -> String {
        match self {
            BlockSource::File(path) => path.display().to_string(),
            BlockSource::Record(record) => format!("record #{}", record.id),
            BlockSource::Inline { origin, .. } => origin.clone(),
        }
    }

    fn text(&self) -> Result<Cow<'_, str>, SourceError> {
        match self {
            BlockSource::File(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                }),
            BlockSource::Record(record) => Ok(Cow::Borrowed(&record.content)),
            BlockSource::Inline { json, .. } => Ok(Cow::Borrowed(json)),
        }
    }

    /// Read and decode this source into a block map
    pub fn decode(&self) -> Result<BlockMap, SourceError> {
        let text = self.text()?;
        parse_block_document(&text).map_err(|source| SourceError::Decode {
            origin: self.origin(),
            source,
        })
    }
}

/// Decode a JSON block document.
///
/// The document must be an object mapping block keys to block definitions;
/// anything else is rejected as a whole.
pub fn parse_block_document(json: &str) -> Result<BlockMap, serde_json::Error> {
    serde_json::from_str(json)
}

/// Merged block map together with its JSON serialization
#[derive(Debug, Clone)]
pub struct LoadedBlocks {
    blocks: BlockMap,
    json: String,
}

impl Default for LoadedBlocks {
    fn default() -> Self {
        Self {
            blocks: BlockMap::new(),
            json: String::from("{}"),
        }
    }
}

impl LoadedBlocks {
    /// Wrap a block map, serializing it for the editor hand-off
    pub fn new(blocks: BlockMap) -> Self {
        let json = serde_json::to_string(&blocks).unwrap_or_else(|e| {
            tracing::warn!(%e, "failed to serialize block map");
            String::from("{}")
        });
        Self { blocks, json }
    }

    pub fn blocks(&self) -> &BlockMap {
        &self.blocks
    }

    /// The serialized block map, handed verbatim to the editor
    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn get(&self, key: &str) -> Option<&BlockDefinition> {
        self.blocks.get(key)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_blocks(self) -> BlockMap {
        self.blocks
    }
}

/// Merge `sources` in order; later blocks replace earlier blocks of the same key.
///
/// Sources that fail to read or decode are logged and skipped.
pub fn merge_sources<I>(sources: I) -> LoadedBlocks
where
    I: IntoIterator<Item = BlockSource>,
{
    let mut blocks = BlockMap::new();

    for source in sources {
        match source.decode() {
            Ok(decoded) => {
                tracing::debug!(
                    origin = %source.origin(),
                    blocks = decoded.len(),
                    "merging block source"
                );
                blocks.extend(decoded);
            }
            Err(e) => {
                tracing::warn!(origin = %source.origin(), %e, "skipping invalid block source");
            }
        }
    }

    LoadedBlocks::new(blocks)
}

/// Load blocks from files (highest precedence last) and then from records.
///
/// Records always win over files when keys collide.
pub fn load(files: &[PathBuf], records: &[ContentRecord]) -> LoadedBlocks {
    let sources = files
        .iter()
        .cloned()
        .map(BlockSource::File)
        .chain(records.iter().cloned().map(BlockSource::Record));

    merge_sources(sources)
}

/// Errors raised while reading a single source.
///
/// These never escape the loader; they are logged and the source is skipped.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid block map
    #[error("invalid block document in {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}
