//! Rendering of IR models into Python source files.
//!
//! Each generated type becomes one module containing the model declaration,
//! a dict-shaped input declaration using the widened param types, and a
//! union alias covering both. All iteration is over insertion-ordered data,
//! so identical IR produces byte-for-byte identical text.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::ir::emit::{CodeBuilder, INDENT};
use crate::ir::types::{
    FieldDefault, GeneratedDataclass, GeneratedEnum, GeneratedModel, GeneratedType, IrMap,
};

const HEADER: &str = "# Code generated by bundlegen. DO NOT EDIT.\n";

/// One output source artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root, e.g.
    /// `databricks/bundles/jobs/_models/task.py`.
    pub path: String,
    pub contents: String,
}

/// Render every IR model into a source file, in IR order.
pub fn render_files(models: &IrMap, config: &GeneratorConfig) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    for model in models.values() {
        let contents = match model {
            GeneratedModel::Dataclass(dataclass) => render_dataclass(dataclass, config),
            GeneratedModel::Enum(generated_enum) => render_enum(generated_enum),
        };
        let path = format!("{}.py", model.package().replace('.', "/"));
        debug!(path = %path, class = %model.class_name(), "Rendered source file.");
        files.push(GeneratedFile { path, contents });
    }
    files
}

// =============================================================================
// Imports
// =============================================================================

#[derive(Debug, Default)]
struct ImportSet {
    /// Names imported from `typing`.
    typing: BTreeSet<&'static str>,
    /// Names imported from `dataclasses`.
    dataclasses: BTreeSet<&'static str>,
    /// Module path to symbol names, imported at runtime.
    runtime: BTreeMap<String, BTreeSet<String>>,
    /// Module path to symbol names, imported under `if TYPE_CHECKING:`.
    deferred: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    fn collect_type(&mut self, ty: &GeneratedType, own_package: &str) {
        ty.walk(&mut |node| {
            match &node.package {
                None => {
                    let typing_name = match node.name.as_str() {
                        "Dict" => Some("Dict"),
                        "List" => Some("List"),
                        "Optional" => Some("Optional"),
                        "Literal" => Some("Literal"),
                        _ => None,
                    };
                    if let Some(name) = typing_name {
                        self.typing.insert(name);
                    }
                }
                Some(package) if package != own_package => {
                    let group = if node.quoted {
                        &mut self.deferred
                    } else {
                        &mut self.runtime
                    };
                    group
                        .entry(package.clone())
                        .or_default()
                        .insert(node.name.clone());
                }
                Some(_) => {}
            }
        });
    }

    /// Drop deferred entries that are also imported at runtime.
    fn dedupe(&mut self) {
        for (module, names) in &self.runtime {
            if let Some(deferred) = self.deferred.get_mut(module) {
                deferred.retain(|name| !names.contains(name));
            }
        }
        self.deferred.retain(|_, names| !names.is_empty());
    }

    fn render(&self, builder: &mut CodeBuilder) {
        if !self.dataclasses.is_empty() {
            let names: Vec<String> = self.dataclasses.iter().map(ToString::to_string).collect();
            builder.append("from dataclasses import ");
            builder.append_list(&names, ", ");
            builder.newline();
        }
        if !self.typing.is_empty() {
            let names: Vec<String> = self.typing.iter().map(ToString::to_string).collect();
            builder.append("from typing import ");
            builder.append_list(&names, ", ");
            builder.newline();
        }
        if !self.runtime.is_empty() {
            builder.newline();
            for (module, names) in &self.runtime {
                let names: Vec<String> = names.iter().cloned().collect();
                builder.append("from ").append(module).append(" import ");
                builder.append_list(&names, ", ");
                builder.newline();
            }
        }
        if !self.deferred.is_empty() {
            builder.newline().append("if TYPE_CHECKING:").newline();
            for (module, names) in &self.deferred {
                let names: Vec<String> = names.iter().cloned().collect();
                builder
                    .indent()
                    .append("from ")
                    .append(module)
                    .append(" import ");
                builder.append_list(&names, ", ");
                builder.newline();
            }
        }
    }
}

// =============================================================================
// Dataclasses
// =============================================================================

fn render_dataclass(dataclass: &GeneratedDataclass, config: &GeneratorConfig) -> String {
    let mut imports = ImportSet::default();
    imports.dataclasses.insert("dataclass");
    imports.typing.insert("TypedDict");
    for field in &dataclass.fields {
        imports.collect_type(&field.type_name, &dataclass.package);
        imports.collect_type(&field.param_type_name, &dataclass.package);
        imports.collect_type(&field.create_func_type_name, &dataclass.package);
        if matches!(field.default, FieldDefault::Factory(_)) {
            imports.dataclasses.insert("field");
        }
    }
    for base in &dataclass.extends {
        if let Some((module, name)) = base.rsplit_once('.') {
            imports
                .runtime
                .entry(module.to_string())
                .or_default()
                .insert(name.to_string());
        }
    }
    if !dataclass.fields.is_empty() {
        imports
            .runtime
            .entry(format!("{}.core._transform", config.package_root))
            .or_default()
            .insert("_transform".to_string());
    }
    imports.dedupe();
    if !imports.deferred.is_empty() {
        imports.typing.insert("TYPE_CHECKING");
    }

    let mut builder = CodeBuilder::new();
    builder.append(HEADER).newline();
    imports.render(&mut builder);
    builder.newline().newline();

    // Class declaration
    builder.append("@dataclass(");
    builder.append_dict(&[("kw_only".to_string(), "True".to_string())], ", ");
    builder.append(")").newline();
    builder.append("class ").append(&dataclass.class_name);
    if !dataclass.extends.is_empty() {
        let bases: Vec<String> = dataclass
            .extends
            .iter()
            .map(|base| {
                base.rsplit_once('.')
                    .map_or_else(|| base.clone(), |(_, name)| name.to_string())
            })
            .collect();
        builder.append("(");
        builder.append_list(&bases, ", ");
        builder.append(")");
    }
    builder.append(":").newline();

    render_docstring(
        &mut builder,
        1,
        dataclass.description.as_deref(),
        dataclass.experimental,
    );

    if dataclass.fields.is_empty() {
        builder.indent().append("pass").newline();
    }

    for field in &dataclass.fields {
        builder.newline();
        builder
            .indent()
            .append(&field.field_name)
            .append(": ")
            .append(&field.type_name.render());
        match &field.default {
            FieldDefault::Required => {}
            FieldDefault::Value(value) => {
                builder.append(" = ").append(value);
            }
            FieldDefault::Factory(factory) => {
                builder.append(" = field(");
                builder.append_dict(
                    &[("default_factory".to_string(), factory.clone())],
                    ", ",
                );
                builder.append(")");
            }
        }
        builder.newline();
        render_docstring(&mut builder, 1, field.description.as_deref(), field.experimental);
    }

    if !dataclass.fields.is_empty() {
        render_create_method(&mut builder, dataclass);
    }

    // Dict-shaped input declaration
    builder.newline().newline();
    builder
        .append("class ")
        .append(&dataclass.class_name)
        .append("Dict(TypedDict, total=False):")
        .newline();
    if dataclass.fields.is_empty() {
        builder.indent().append("pass").newline();
    }
    for field in &dataclass.fields {
        builder
            .indent()
            .append(&field.field_name)
            .append(": ")
            .append(&field.param_type_name.render())
            .newline();
    }

    // Union alias: anything acceptable as input for this type
    builder.newline().newline();
    builder
        .append(&dataclass.class_name)
        .append("Param = ")
        .append(&dataclass.class_name)
        .append("Dict | ")
        .append(&dataclass.class_name)
        .newline();

    builder.build()
}

fn render_create_method(builder: &mut CodeBuilder, dataclass: &GeneratedDataclass) {
    builder.newline();
    builder.indent().append("@classmethod").newline();
    builder.indent().append("def create(").newline();
    builder.indent().indent().append("cls,").newline();
    builder.indent().indent().append("/,").newline();
    builder.indent().indent().append("*,").newline();
    for field in &dataclass.fields {
        builder
            .indent()
            .indent()
            .append(&field.field_name)
            .append(": ")
            .append(&field.create_func_type_name.render());
        if !field.is_required() {
            builder.append(" = None");
        }
        builder.append(",").newline();
    }
    builder
        .indent()
        .append(") -> \"")
        .append(&dataclass.class_name)
        .append("\":")
        .newline();
    builder
        .indent()
        .indent()
        .append("return _transform(cls, locals())")
        .newline();
}

// =============================================================================
// Enums
// =============================================================================

fn render_enum(generated_enum: &GeneratedEnum) -> String {
    let mut builder = CodeBuilder::new();
    builder.append(HEADER).newline();
    builder.append("from enum import Enum").newline();
    builder.append("from typing import Literal").newline();
    builder.newline().newline();

    builder
        .append("class ")
        .append(&generated_enum.class_name)
        .append("(Enum):")
        .newline();
    render_docstring(
        &mut builder,
        1,
        generated_enum.description.as_deref(),
        generated_enum.experimental,
    );
    if generated_enum.description.is_some() || generated_enum.experimental {
        builder.newline();
    }
    for (constant, value) in &generated_enum.values {
        builder
            .indent()
            .append(constant)
            .append(" = ")
            .append(&quote_py_string(value))
            .newline();
    }

    // Union alias: literal wire values or the enum itself
    builder.newline().newline();
    let literals: Vec<String> = generated_enum
        .values
        .iter()
        .map(|(_, value)| quote_py_string(value))
        .collect();
    builder
        .append(&generated_enum.class_name)
        .append("Param = Literal[");
    builder.append_list(&literals, ", ");
    builder
        .append("] | ")
        .append(&generated_enum.class_name)
        .newline();

    builder.build()
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Render a docstring at the given indent level, including the
/// `[Experimental]` marker when set. Emits nothing when there is nothing to
/// say.
fn render_docstring(
    builder: &mut CodeBuilder,
    level: usize,
    description: Option<&str>,
    experimental: bool,
) {
    let mut lines: Vec<&str> = description.map(str::lines).into_iter().flatten().collect();
    if experimental {
        if !lines.is_empty() {
            lines.push("");
        }
        lines.push("[Experimental]");
    }
    if lines.is_empty() {
        return;
    }

    let prefix = INDENT.repeat(level);
    if lines.len() == 1 {
        builder
            .append(&prefix)
            .append("\"\"\"")
            .append(lines[0])
            .append("\"\"\"")
            .newline();
        return;
    }

    builder.append(&prefix).append("\"\"\"").append(lines[0]).newline();
    for line in &lines[1..] {
        if line.is_empty() {
            builder.newline();
        } else {
            builder.append(&prefix).append(line).newline();
        }
    }
    builder.append(&prefix).append("\"\"\"").newline();
}

/// Quote a wire value as a Python string literal.
fn quote_py_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
