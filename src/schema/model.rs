//! Schema document structs for serde deserialization.
//!
//! This module defines the subset of the JSON-Schema-like API description
//! that the generator consumes: a `$defs` map of named schemas, each with
//! typed properties, required lists, and enum values. Property order and
//! enum order are significant, so all maps are insertion-ordered.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::GenError;

/// Named schemas keyed by `<namespace>.<TypeName>`, in document order.
pub type SchemaMap = IndexMap<String, Schema>;

/// Prefix every placeholder pattern starts with: `\$\{` matching `${...}`.
const VARIABLE_PATTERN_PREFIX: &str = "\\$\\{";

/// Root schema document.
#[derive(Debug, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "$defs", default)]
    pub defs: SchemaMap,
}

/// One named schema node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    /// The type of the schema, if declared.
    #[serde(rename = "type")]
    pub kind: Option<SchemaKind>,

    /// Field name to property fragment, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, Property>,

    /// Field names that must be present, in declaration order.
    #[serde(default)]
    pub required: Vec<String>,

    /// Literal string values for enum-shaped schemas, in declaration order.
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,

    pub description: Option<String>,

    /// Visibility stage marker; anything other than `stable` marks the
    /// generated type as experimental.
    pub stage: Option<String>,
}

/// Schema type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Object,
    String,
    Integer,
    Number,
    Boolean,
    Array,
}

/// A single field's schema fragment.
///
/// A property is either a plain `$ref`, or a `oneOf`/`anyOf` union that may
/// collapse to one via [`Property::effective_ref`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Property {
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    pub description: Option<String>,

    #[serde(rename = "oneOf", default)]
    pub one_of: Vec<UnionBranch>,

    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<UnionBranch>,
}

/// One branch of a property-level `oneOf`/`anyOf`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnionBranch {
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<SchemaKind>,

    pub pattern: Option<String>,
}

impl SchemaDocument {
    /// Parse a schema document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GenError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Schema {
    /// Check the structural invariants the rest of the pipeline relies on.
    pub fn validate(&self, name: &str) -> Result<(), GenError> {
        for field in &self.required {
            if !self.properties.contains_key(field) {
                return Err(GenError::malformed(
                    name,
                    format!("required field '{field}' is absent from properties"),
                ));
            }
        }
        Ok(())
    }

    /// Whether the schema carries a non-stable stage marker.
    pub fn is_experimental(&self) -> bool {
        self.stage.as_deref().is_some_and(|stage| stage != "stable")
    }
}

impl UnionBranch {
    /// A string branch whose pattern is the `${...}` placeholder regex.
    fn is_variable_placeholder(&self) -> bool {
        self.kind == Some(SchemaKind::String)
            && self
                .pattern
                .as_deref()
                .is_some_and(|p| p.starts_with(VARIABLE_PATTERN_PREFIX))
    }
}

impl Property {
    /// Resolve the property to a single reference string.
    ///
    /// Many fields are declared as `oneOf: [<real type>, <placeholder
    /// string>]`, meaning "either a value of the real type, or a `${var.x}`
    /// placeholder". Exactly that two-branch shape collapses to the first
    /// branch; any other union shape is left unresolved and the caller must
    /// tolerate it.
    pub fn effective_ref(&self) -> Option<&str> {
        if let Some(ref_path) = &self.ref_path {
            return Some(ref_path);
        }
        Self::unwrap_variable_union(&self.one_of)
            .or_else(|| Self::unwrap_variable_union(&self.any_of))
    }

    fn unwrap_variable_union(branches: &[UnionBranch]) -> Option<&str> {
        match branches {
            [real, placeholder] if placeholder.is_variable_placeholder() => {
                real.ref_path.as_deref()
            }
            _ => None,
        }
    }
}
