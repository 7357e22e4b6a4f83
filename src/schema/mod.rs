//! Schema document parsing and pre-generation patches.
//!
//! - `model`: serde structs for the `$defs` schema document
//! - `patch`: named schema-level transformations applied before generation

pub mod model;
pub mod patch;

pub use model::{Property, Schema, SchemaDocument, SchemaKind, SchemaMap};
