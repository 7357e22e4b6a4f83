//! IR-level patch pipeline.
//!
//! These passes need the complete IR map because they reason about
//! cross-type relationships: reference cycles and constructor field order.
//! Each pass returns a new, fully-formed map.

use std::collections::HashMap;

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::ir::types::{GeneratedField, GeneratedModel, GeneratedType, IrMap};

/// Mark references in the configured cycle-breaking set as deferred.
///
/// For each `(declaring type, referenced class names)` entry, every
/// reference to a listed class inside the declaring type's fields is marked
/// quoted, recursively through container parameters. The pass does not
/// detect cycles; the set is enumerated ahead of time, and an entry that
/// quotes nothing is a stale patch.
pub fn quote_recursive_refs(models: IrMap, config: &GeneratorConfig) -> Result<IrMap, GenError> {
    let mut models = models;
    for (declaring, targets) in &config.quoted_refs {
        let Some(model) = models.get_mut(declaring) else {
            return Err(GenError::stale_patch(declaring, "type is no longer generated"));
        };
        let GeneratedModel::Dataclass(dataclass) = model else {
            return Err(GenError::stale_patch(declaring, "type has no fields to quote"));
        };

        let mut quoted = 0;
        for field in &mut dataclass.fields {
            quoted += quote_matching(&mut field.type_name, targets);
            quoted += quote_matching(&mut field.param_type_name, targets);
            quoted += quote_matching(&mut field.create_func_type_name, targets);
        }
        if quoted == 0 {
            return Err(GenError::stale_patch(
                declaring,
                format!("no reference to {targets:?} left to quote"),
            ));
        }
        debug!(declaring = %declaring, quoted, "Quoted recursive references.");
    }
    Ok(models)
}

/// Quote the node if it is a named reference to one of the target classes
/// (or their `Param` aliases), recursing through container parameters.
fn quote_matching(ty: &mut GeneratedType, targets: &[String]) -> usize {
    let mut count = 0;
    if ty.package.is_some() {
        let matches = targets
            .iter()
            .any(|t| ty.name == *t || ty.name == format!("{t}Param"));
        if matches {
            ty.quoted = true;
            count += 1;
        }
    }
    for parameter in &mut ty.parameters {
        count += quote_matching(parameter, targets);
    }
    count
}

/// Reorder every model's fields required-first.
///
/// Within each partition the relative order is preserved. Target-language
/// constructors require non-defaulted parameters before defaulted ones, so
/// this is what makes generated constructors valid regardless of schema
/// declaration order. Models with no fields are left untouched.
pub fn reorder_required_fields(models: IrMap) -> IrMap {
    let mut models = models;
    for model in models.values_mut() {
        let GeneratedModel::Dataclass(dataclass) = model else {
            continue;
        };
        if dataclass.fields.is_empty() {
            continue;
        }
        let (required, optional): (Vec<_>, Vec<_>) = dataclass
            .fields
            .drain(..)
            .partition(GeneratedField::is_required);
        dataclass.fields = required.into_iter().chain(optional).collect();
    }
    models
}

/// Assert that the unquoted reference graph of the final IR is acyclic.
///
/// The cycle-breaking set is enumerated ahead of time, so a cycle the set
/// does not cover would otherwise be emitted as an invalid forward
/// reference. New cycles surface as build errors instead.
pub fn assert_no_unlisted_cycles(models: &IrMap) -> Result<(), GenError> {
    // Map (package, class name) back to IR keys for edge resolution.
    let index: HashMap<(&str, &str), &str> = models
        .iter()
        .map(|(key, model)| ((model.package(), model.class_name()), key.as_str()))
        .collect();

    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for (key, model) in models {
        let GeneratedModel::Dataclass(dataclass) = model else {
            continue;
        };
        let mut targets = Vec::new();
        for field in &dataclass.fields {
            field.type_name.walk(&mut |node| {
                if node.quoted {
                    return;
                }
                if let Some(package) = &node.package {
                    if let Some(target) = index.get(&(package.as_str(), node.name.as_str())) {
                        targets.push(*target);
                    }
                }
            });
        }
        edges.insert(key.as_str(), targets);
    }

    let mut state: HashMap<&str, Visit> = HashMap::new();
    for key in models.keys() {
        let mut path = Vec::new();
        if let Some(cycle) = visit(key.as_str(), &edges, &mut state, &mut path) {
            return Err(GenError::UnlistedCycle(cycle.join(" -> ")));
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

fn visit<'a>(
    key: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, Visit>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match state.get(key) {
        Some(Visit::Done) => return None,
        Some(Visit::InProgress) => {
            // Back edge: report the cycle from the first occurrence of key.
            let start = path.iter().position(|p| *p == key).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
            cycle.push(key.to_string());
            return Some(cycle);
        }
        None => {}
    }

    state.insert(key, Visit::InProgress);
    path.push(key);
    if let Some(targets) = edges.get(key) {
        for target in targets {
            if let Some(cycle) = visit(target, edges, state, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    state.insert(key, Visit::Done);
    None
}
