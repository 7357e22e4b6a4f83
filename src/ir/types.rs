//! IR node types for code generation.
//!
//! This module defines the generator's internal model of the output:
//! - GeneratedType: a resolved type signature (primitive, reference, container)
//! - GeneratedField: one field of a model, with strict and widened types
//! - GeneratedDataclass / GeneratedEnum: one output type each

use indexmap::IndexMap;

/// The IR for one generation run, keyed by schema name
/// (`<namespace>.<TypeName>`), in schema document order.
pub type IrMap = IndexMap<String, GeneratedModel>;

/// A fully resolved type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedType {
    /// Target-language type name (`str`, `Task`, `Dict`, ...).
    pub name: String,
    /// Owning package for named references; `None` for primitives and
    /// container heads.
    pub package: Option<String>,
    /// Nested type parameters for containers (`Dict`, `List`, `Optional`,
    /// `Union`, `Literal`).
    pub parameters: Vec<GeneratedType>,
    /// Deferred (forward-declared) reference: rendered as a string literal
    /// so the referent need not be defined yet.
    pub quoted: bool,
}

impl GeneratedType {
    /// A bare primitive or literal type.
    pub fn primitive(name: impl Into<String>) -> Self {
        GeneratedType {
            name: name.into(),
            package: None,
            parameters: Vec::new(),
            quoted: false,
        }
    }

    /// A named reference into a generated package.
    pub fn reference(name: impl Into<String>, package: impl Into<String>) -> Self {
        GeneratedType {
            name: name.into(),
            package: Some(package.into()),
            parameters: Vec::new(),
            quoted: false,
        }
    }

    /// A container type with parameters.
    pub fn container(name: impl Into<String>, parameters: Vec<GeneratedType>) -> Self {
        GeneratedType {
            name: name.into(),
            package: None,
            parameters,
            quoted: false,
        }
    }

    pub fn optional(inner: GeneratedType) -> Self {
        Self::container("Optional", vec![inner])
    }

    /// Whether this is a container whose optional default should be an
    /// empty-collection factory rather than `None`.
    pub fn is_collection(&self) -> bool {
        self.package.is_none() && matches!(self.name.as_str(), "Dict" | "List")
    }

    /// Render the Python type expression.
    pub fn render(&self) -> String {
        let base = if self.quoted && self.package.is_some() {
            format!("\"{}\"", self.name)
        } else {
            self.name.clone()
        };
        if self.parameters.is_empty() {
            base
        } else {
            let params: Vec<String> = self.parameters.iter().map(GeneratedType::render).collect();
            format!("{}[{}]", base, params.join(", "))
        }
    }

    /// Visit this node and every nested parameter.
    pub fn walk(&self, visit: &mut impl FnMut(&GeneratedType)) {
        visit(self);
        for parameter in &self.parameters {
            parameter.walk(visit);
        }
    }
}

/// How a field obtains a value when the caller omits it.
///
/// A field is *required* iff it has no default; value and factory defaults
/// are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDefault {
    Required,
    /// Literal default expression, e.g. `None`.
    Value(String),
    /// Zero-argument factory name, e.g. `list`.
    Factory(String),
}

/// One field of a generated model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedField {
    pub field_name: String,
    /// Strict stored/output type.
    pub type_name: GeneratedType,
    /// Widened "accepts" type used in the dict-shaped input declaration.
    pub param_type_name: GeneratedType,
    /// Keyword-argument type for the generated `create` function.
    pub create_func_type_name: GeneratedType,
    pub default: FieldDefault,
    pub description: Option<String>,
    pub experimental: bool,
}

impl GeneratedField {
    pub fn is_required(&self) -> bool {
        self.default == FieldDefault::Required
    }
}

/// A generated model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDataclass {
    pub class_name: String,
    pub package: String,
    /// Field order is significant: constructor validity depends on the
    /// required-first reordering pass.
    pub fields: Vec<GeneratedField>,
    pub description: Option<String>,
    /// Supertypes, as fully qualified Python names.
    pub extends: Vec<String>,
    pub experimental: bool,
}

/// A generated enum type. Constant order follows the schema enum order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEnum {
    pub class_name: String,
    pub package: String,
    /// Constant name to literal wire value.
    pub values: Vec<(String, String)>,
    pub description: Option<String>,
    pub experimental: bool,
}

/// One entry of the IR map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedModel {
    Dataclass(GeneratedDataclass),
    Enum(GeneratedEnum),
}

impl GeneratedModel {
    pub fn class_name(&self) -> &str {
        match self {
            GeneratedModel::Dataclass(dc) => &dc.class_name,
            GeneratedModel::Enum(en) => &en.class_name,
        }
    }

    pub fn package(&self) -> &str {
        match self {
            GeneratedModel::Dataclass(dc) => &dc.package,
            GeneratedModel::Enum(en) => &en.package,
        }
    }
}
