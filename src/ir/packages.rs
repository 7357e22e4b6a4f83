//! Reference resolver and package mapper.
//!
//! Pure functions over the static configuration tables: a reference string
//! resolves to either a built-in primitive (after the rename table), a
//! fully qualified target package, or "not loaded".

use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::ir::utils::to_snake_case;

/// Every resolvable reference starts with this prefix.
pub const REF_PREFIX: &str = "#/$defs/";

/// Reserved container prefixes; the remainder is the element reference.
pub const MAP_PREFIX: &str = "map/";
pub const LIST_PREFIX: &str = "list/";

/// Strip the `#/$defs/` prefix from a reference.
pub fn ref_name(ref_path: &str) -> Result<&str, GenError> {
    ref_path
        .strip_prefix(REF_PREFIX)
        .ok_or_else(|| GenError::UnresolvableRef(ref_path.to_string()))
}

/// The element reference of a container ref body (e.g. `jobs.Task` out of
/// `map/jobs.Task`), re-prefixed so it can be resolved recursively.
pub fn element_ref(container_body: &str) -> String {
    format!("{REF_PREFIX}{container_body}")
}

/// Whether the reference names a built-in primitive.
pub fn is_primitive(ref_path: &str, config: &GeneratorConfig) -> bool {
    ref_name(ref_path).is_ok_and(|name| config.primitive_renames.contains_key(name))
}

/// Whether the reference should be loaded at all: a primitive, a container
/// of loadable elements, or a type in an allow-listed namespace. Anything
/// else is dropped rather than generated, because the full schema corpus
/// contains types that cannot yet be generated correctly.
pub fn should_load(ref_path: &str, config: &GeneratorConfig) -> bool {
    let Ok(name) = ref_name(ref_path) else {
        return false;
    };
    if let Some(body) = name.strip_prefix(MAP_PREFIX) {
        return should_load(&element_ref(body), config);
    }
    if let Some(body) = name.strip_prefix(LIST_PREFIX) {
        return should_load(&element_ref(body), config);
    }
    if config.primitive_renames.contains_key(name) {
        return true;
    }
    match name.split_once('.') {
        Some((namespace, _)) => config
            .allowed_namespaces
            .iter()
            .any(|allowed| allowed == namespace),
        None => false,
    }
}

/// Resolve a reference to its owning package: `None` for primitives,
/// `Some(package)` for namespaced types.
pub fn package_for(ref_path: &str, config: &GeneratorConfig) -> Result<Option<String>, GenError> {
    let name = ref_name(ref_path)?;
    if config.primitive_renames.contains_key(name) {
        return Ok(None);
    }
    let Some((namespace, type_name)) = name.split_once('.') else {
        return Err(GenError::UnresolvableRef(ref_path.to_string()));
    };
    Ok(Some(package_path(namespace, type_name, config)))
}

/// The generated package for a namespaced type, applying the namespace
/// override table (e.g. `resources.Job` lands in the `jobs` package).
pub fn package_path(namespace: &str, type_name: &str, config: &GeneratorConfig) -> String {
    let mapped = config
        .package_overrides
        .get(namespace)
        .map_or(namespace, String::as_str);
    format!(
        "{}.{}._models.{}",
        config.package_root,
        mapped,
        to_snake_case(type_name)
    )
}

/// Extract the target-language class name from a reference, applying the
/// primitive rename table.
pub fn class_name(ref_path: &str, config: &GeneratorConfig) -> Result<String, GenError> {
    let name = ref_name(ref_path)?;
    if let Some(renamed) = config.primitive_renames.get(name) {
        return Ok(renamed.clone());
    }
    match name.rsplit_once('.') {
        Some((_, class)) => Ok(class.to_string()),
        None => Err(GenError::UnresolvableRef(ref_path.to_string())),
    }
}
