//! Block runtime
//!
//! This module wires loading, registration and rendering together. A
//! [`BlockLoader`] owns the configuration, the search roots, the record store
//! and the template collaborator; it rebuilds the block map on demand and
//! registers every loaded block with a [`BlockRegistrar`].

pub mod editor;
pub mod output;
pub mod render;
pub mod template;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::LoaderConfig;
use crate::core::registry::{register_all, BlockRegistrar};
use crate::source::{self, ContentStore, LoadedBlocks, TemplateLocator};

use editor::{EditorAssets, EditorBundle};
use output::OutputFilters;
use render::{RenderContext, TemplateRenderer};
use template::{LiquidTemplates, TemplateError};

/// Loads, registers and renders blocks for one host
pub struct BlockLoader {
    config: LoaderConfig,
    locator: TemplateLocator,
    store: Option<Arc<dyn ContentStore>>,
    templates: Arc<dyn TemplateRenderer>,
    loaded: LoadedBlocks,
}

impl BlockLoader {
    /// Create a loader with an explicit template collaborator
    pub fn new(
        config: LoaderConfig,
        locator: TemplateLocator,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            config,
            locator,
            store: None,
            templates,
            loaded: LoadedBlocks::default(),
        }
    }

    /// Create a loader rendering Liquid templates found under the search roots
    pub fn with_liquid(
        config: LoaderConfig,
        locator: TemplateLocator,
        filters: OutputFilters,
    ) -> Result<Self, TemplateError> {
        let templates = LiquidTemplates::new(locator.clone(), &config, filters)?;
        Ok(Self::new(config, locator, Arc::new(templates)))
    }

    /// Attach the store of block records
    pub fn with_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn locator(&self) -> &TemplateLocator {
        &self.locator
    }

    /// Render context for a request's `context` parameter, using the configured preview value
    pub fn render_context(&self, context: Option<&str>) -> RenderContext {
        RenderContext::from_request_with(context, &self.config.edit_context)
    }

    /// Block files to merge, lowest precedence first
    pub fn block_files(&self) -> Vec<PathBuf> {
        let mut files = self.locator.locate_all(&self.config.blocks_file);
        files.reverse();
        files
    }

    /// Rebuild the block map from block files and stored records
    pub fn retrieve_blocks(&mut self) -> &LoadedBlocks {
        let files = self.block_files();
        let records = self
            .store
            .as_ref()
            .map(|store| store.query(&self.config.record_query()))
            .unwrap_or_default();

        self.loaded = source::load(&files, &records);
        tracing::debug!(
            files = files.len(),
            records = records.len(),
            blocks = self.loaded.len(),
            "retrieved blocks"
        );

        &self.loaded
    }

    /// The block map from the last [`retrieve_blocks`](Self::retrieve_blocks)
    pub fn blocks(&self) -> &LoadedBlocks {
        &self.loaded
    }

    /// Register every loaded block, returning how many were registered
    pub fn register_all(&self, registrar: &mut dyn BlockRegistrar) -> usize {
        register_all(
            self.loaded.blocks(),
            Arc::clone(&self.templates),
            &self.config.identifier_prefix,
            registrar,
        )
    }

    /// Editor hand-off for the loaded blocks
    pub fn editor_bundle(&self, assets: EditorAssets) -> EditorBundle {
        EditorBundle::new(assets, &self.config.editor_global, self.loaded.json())
    }
}
