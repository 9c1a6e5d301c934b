//! Core block abstractions and types
//!
//! This module defines the block and field definitions, the translation of
//! fields into attribute schemas, registration identifiers, and the registry
//! that holds registered blocks.

pub mod block;
pub mod identifier;
pub mod registry;
pub mod schema;

pub use block::{Attributes, BlockDefinition, BlockMap, FieldDefinition, FieldMap};
pub use identifier::registration_identifier;
pub use registry::{register_all, BlockRegistrar, BlockRegistration, BlockRegistry, RegistryError};
pub use schema::{translate, AttributeSchema, AttributeSpec, ItemsSpec};
