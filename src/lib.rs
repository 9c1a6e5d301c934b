//! Block Loader - dynamic content blocks from JSON field definitions
//!
//! This crate loads block definitions from bundled JSON files and stored
//! content records, translates their fields into attribute schemas for the
//! host's block registration API, and renders each block server-side through a
//! template collaborator.

pub mod config;
pub mod core;
pub mod runtime;
pub mod source;
mod tests;

// Re-export commonly used types
pub use config::LoaderConfig;
pub use crate::core::block::{Attributes, BlockDefinition, BlockMap, FieldDefinition};
pub use crate::core::registry::{BlockRegistrar, BlockRegistration, BlockRegistry};
pub use crate::core::schema::{translate, AttributeSchema, AttributeSpec};
pub use runtime::output::{OutputFilters, OutputValue};
pub use runtime::render::{RenderContext, TemplateRenderer};
pub use runtime::BlockLoader;
pub use source::{LoadedBlocks, TemplateLocator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
