//! Block Registry - registration of loaded blocks with their render callbacks
//!
//! Each block in a loaded [`BlockMap`] is registered under a sanitized
//! identifier together with its attribute schema and a [`BlockRenderer`] that
//! owns a copy of the block definition. Registration goes through the
//! [`BlockRegistrar`] trait so a host can receive the registrations directly;
//! [`BlockRegistry`] is the in-crate implementation.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::block::{Attributes, BlockDefinition, BlockMap};
use super::identifier::registration_identifier_with_prefix;
use super::schema::{translate, AttributeSchema};
use crate::runtime::render::{BlockRenderer, RenderContext, TemplateRenderer};

/// Everything the host needs to register one block
#[derive(Debug, Clone)]
pub struct BlockRegistration {
    /// Sanitized block type identifier
    pub identifier: String,
    /// Attribute schema derived from the block's fields
    pub attributes: AttributeSchema,
    /// Render callback owning the block definition
    pub renderer: BlockRenderer,
}

impl BlockRegistration {
    /// Build the registration of one block
    ///
    /// # Arguments
    /// * `block_key` - Key of the block in the block map
    /// * `block` - The block definition; it is copied into the renderer
    /// * `prefix` - Prefix for keys that start with a digit
    /// * `templates` - Template collaborator used at render time
    pub fn new(
        block_key: &str,
        block: &BlockDefinition,
        prefix: &str,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            identifier: registration_identifier_with_prefix(block_key, prefix),
            attributes: translate(block),
            renderer: BlockRenderer::new(block.clone(), templates),
        }
    }

    /// Render this block
    pub fn render(&self, supplied: &Attributes, context: &RenderContext) -> String {
        self.renderer.render(supplied, context)
    }
}

/// Host block registration facility
pub trait BlockRegistrar {
    /// Register a block type; a later registration with the same identifier replaces it
    fn register_block_type(&mut self, registration: BlockRegistration);
}

/// Register every block in `blocks`, returning how many were registered
pub fn register_all(
    blocks: &BlockMap,
    templates: Arc<dyn TemplateRenderer>,
    prefix: &str,
    registrar: &mut dyn BlockRegistrar,
) -> usize {
    for (block_key, block) in blocks {
        let registration = BlockRegistration::new(block_key, block, prefix, Arc::clone(&templates));
        tracing::debug!(
            key = %block_key,
            identifier = %registration.identifier,
            attributes = registration.attributes.len(),
            "registering block"
        );
        registrar.register_block_type(registration);
    }

    blocks.len()
}

/// Thread-safe registry of block registrations
///
/// The registry uses `Arc<RwLock<HashMap>>` so renders can run concurrently
/// while registration takes the write lock.
#[derive(Clone, Default)]
pub struct BlockRegistry {
    blocks: Arc<RwLock<HashMap<String, Arc<BlockRegistration>>>>,
}

impl BlockRegistry {
    /// Create a new empty block registry
    ///
    /// # Example
    /// ```
    /// use block_loader::core::registry::BlockRegistry;
    ///
    /// let registry = BlockRegistry::new();
    /// assert_eq!(registry.count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block, replacing any block with the same identifier
    ///
    /// # Returns
    /// The registration that was replaced, if any
    pub fn register(&self, registration: BlockRegistration) -> Option<Arc<BlockRegistration>> {
        let mut blocks = self.blocks.write();
        let replaced = blocks.insert(registration.identifier.clone(), Arc::new(registration));

        if let Some(previous) = &replaced {
            tracing::debug!(identifier = %previous.identifier, "replacing registered block");
        }

        replaced
    }

    /// Unregister a block
    ///
    /// # Returns
    /// * `Ok(())` if unregistration succeeds
    /// * `Err(RegistryError)` if the block is not found
    pub fn unregister(&self, identifier: &str) -> Result<(), RegistryError> {
        let mut blocks = self.blocks.write();

        blocks
            .remove(identifier)
            .ok_or_else(|| RegistryError::BlockNotFound(identifier.to_string()))?;

        Ok(())
    }

    /// Get a registration by identifier
    pub fn get(&self, identifier: &str) -> Result<Arc<BlockRegistration>, RegistryError> {
        let blocks = self.blocks.read();

        blocks
            .get(identifier)
            .cloned()
            .ok_or_else(|| RegistryError::BlockNotFound(identifier.to_string()))
    }

    /// Render a registered block
    ///
    /// The lock is released before rendering, so templates may take as long
    /// as they need without blocking registration.
    pub fn render(
        &self,
        identifier: &str,
        supplied: &Attributes,
        context: &RenderContext,
    ) -> Result<String, RegistryError> {
        let registration = self.get(identifier)?;
        Ok(registration.render(supplied, context))
    }

    /// All registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<String> {
        let blocks = self.blocks.read();
        let mut identifiers: Vec<String> = blocks.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }

    /// Get the number of registered blocks
    pub fn count(&self) -> usize {
        self.blocks.read().len()
    }

    /// Check if a block with the given identifier exists
    pub fn contains(&self, identifier: &str) -> bool {
        self.blocks.read().contains_key(identifier)
    }

    /// Clear all registered blocks
    pub fn clear(&self) {
        self.blocks.write().clear();
    }
}

impl BlockRegistrar for BlockRegistry {
    fn register_block_type(&mut self, registration: BlockRegistration) {
        self.register(registration);
    }
}

/// Registry error types
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Block with given identifier was not found
    #[error("Block not found: {0}")]
    BlockNotFound(String),
}
