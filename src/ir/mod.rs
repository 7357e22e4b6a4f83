//! Intermediate representation and generation passes.
//!
//! The pipeline runs in strict stages:
//! 1. `packages`: reference resolution (primitive renames, package mapping)
//! 2. `generate`: schema map -> IR map (dataclasses, enums, fields)
//! 3. `passes`: whole-IR transformations (cycle quoting, field reordering)
//! 4. `codegen` + `emit`: IR -> Python source text
//!
//! Stage boundaries matter: the IR passes reason about the complete
//! cross-type reference graph, so every per-type IR node must exist before
//! they run.
//!
//! ## Module Structure
//!
//! - `types`: IR nodes (GeneratedType, GeneratedField, dataclasses, enums)
//! - `packages`: reference resolver / package mapper
//! - `generate`: per-schema IR construction
//! - `passes`: IR-level patch pipeline
//! - `emit`: append-only `CodeBuilder`
//! - `codegen`: IR -> source file rendering
//! - `utils`: name transliteration helpers

pub mod codegen;
pub mod emit;
pub mod generate;
pub mod packages;
pub mod passes;
pub mod types;
pub mod utils;

pub use codegen::{GeneratedFile, render_files};
pub use generate::generate_models;
pub use types::IrMap;
