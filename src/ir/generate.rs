//! IR construction from the patched schema map.
//!
//! All schema-level interpretation happens here: reference resolution,
//! strict vs. widened param types, defaults, and enum constant naming.
//! Whole-IR concerns (cycles, field order) are later passes.

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::ir::packages::{
    LIST_PREFIX, MAP_PREFIX, element_ref, package_path, ref_name, should_load,
};
use crate::ir::types::{
    FieldDefault, GeneratedDataclass, GeneratedEnum, GeneratedField, GeneratedModel,
    GeneratedType, IrMap,
};
use crate::ir::utils::enum_constant_name;
use crate::schema::model::{Schema, SchemaKind, SchemaMap};

/// Build the IR map from the full schema map, in schema document order.
///
/// Schemas outside the allow-listed namespaces, and schemas that are
/// neither object- nor enum-shaped, are dropped rather than generated.
pub fn generate_models(schemas: &SchemaMap, config: &GeneratorConfig) -> Result<IrMap, GenError> {
    let mut models = IrMap::new();
    for (name, schema) in schemas {
        schema.validate(name)?;

        let Some((namespace, _)) = name.split_once('.') else {
            debug!(schema = %name, "Skipping schema without a namespace.");
            continue;
        };
        if !config.allowed_namespaces.iter().any(|ns| ns == namespace) {
            debug!(schema = %name, "Skipping schema outside allow-listed namespaces.");
            continue;
        }

        let model = if !schema.enum_values.is_empty() {
            Some(GeneratedModel::Enum(generate_enum(name, schema, config)?))
        } else if schema.kind == Some(SchemaKind::Object) {
            Some(GeneratedModel::Dataclass(generate_dataclass(
                name, schema, schemas, config,
            )?))
        } else {
            debug!(schema = %name, "Skipping schema that is neither object- nor enum-shaped.");
            None
        };
        if let Some(model) = model {
            models.insert(name.clone(), model);
        }
    }
    debug!(count = models.len(), "Generated IR models.");
    Ok(models)
}

/// Resolve a reference into a generated type.
///
/// Container refs (`map/`, `list/`) recursively generate the element type
/// and wrap it. With `is_param` set, namespaced references resolve to the
/// widened `<Name>Param` union alias instead of the strict class.
pub fn generate_type(
    ref_path: &str,
    is_param: bool,
    config: &GeneratorConfig,
) -> Result<GeneratedType, GenError> {
    let name = ref_name(ref_path)?;

    if let Some(body) = name.strip_prefix(MAP_PREFIX) {
        let value = generate_type(&element_ref(body), is_param, config)?;
        return Ok(GeneratedType::container(
            "Dict",
            vec![GeneratedType::primitive("str"), value],
        ));
    }
    if let Some(body) = name.strip_prefix(LIST_PREFIX) {
        let element = generate_type(&element_ref(body), is_param, config)?;
        return Ok(GeneratedType::container("List", vec![element]));
    }
    if let Some(renamed) = config.primitive_renames.get(name) {
        return Ok(GeneratedType::primitive(renamed));
    }

    let Some((namespace, class)) = name.split_once('.') else {
        return Err(GenError::UnresolvableRef(ref_path.to_string()));
    };
    let package = package_path(namespace, class, config);
    let type_name = if is_param {
        format!("{class}Param")
    } else {
        class.to_string()
    };
    Ok(GeneratedType::reference(type_name, package))
}

/// Generate one dataclass from an object schema.
///
/// Fields appear in schema declaration order; the required-first reordering
/// is a separate IR pass.
fn generate_dataclass(
    name: &str,
    schema: &Schema,
    schemas: &SchemaMap,
    config: &GeneratorConfig,
) -> Result<GeneratedDataclass, GenError> {
    let (namespace, class) = split_schema_name(name)?;

    let mut fields = Vec::new();
    for (field_name, property) in &schema.properties {
        let Some(ref_path) = property.effective_ref() else {
            debug!(schema = %name, field = %field_name, "Skipping field with unresolved union shape.");
            continue;
        };
        if !should_load(ref_path, config) {
            debug!(schema = %name, field = %field_name, r#ref = %ref_path, "Skipping field outside allow-listed namespaces.");
            continue;
        }

        let strict = generate_type(ref_path, false, config)?;
        let param = generate_type(ref_path, true, config)?;
        let required = schema.required.contains(field_name);

        let (type_name, default) = if required {
            (strict.clone(), FieldDefault::Required)
        } else if strict.is_collection() {
            let factory = if strict.name == "Dict" { "dict" } else { "list" };
            (strict.clone(), FieldDefault::Factory(factory.to_string()))
        } else {
            (
                GeneratedType::optional(strict.clone()),
                FieldDefault::Value("None".to_string()),
            )
        };
        let create_func_type_name = if required {
            param.clone()
        } else {
            GeneratedType::optional(param.clone())
        };

        fields.push(GeneratedField {
            field_name: field_name.clone(),
            type_name,
            param_type_name: param,
            create_func_type_name,
            default,
            description: property.description.clone(),
            experimental: ref_schema_is_experimental(ref_path, schemas),
        });
    }

    Ok(GeneratedDataclass {
        class_name: class.to_string(),
        package: package_path(namespace, class, config),
        fields,
        description: schema.description.clone(),
        extends: config
            .base_classes
            .get(namespace)
            .cloned()
            .into_iter()
            .collect(),
        experimental: schema.is_experimental(),
    })
}

/// Generate one enum from an enum-shaped schema. Constant names are derived
/// from the wire values by camelCase-to-UPPER_SNAKE transliteration.
fn generate_enum(
    name: &str,
    schema: &Schema,
    config: &GeneratorConfig,
) -> Result<GeneratedEnum, GenError> {
    let (namespace, class) = split_schema_name(name)?;
    let values = schema
        .enum_values
        .iter()
        .map(|value| (enum_constant_name(value), value.clone()))
        .collect();
    Ok(GeneratedEnum {
        class_name: class.to_string(),
        package: package_path(namespace, class, config),
        values,
        description: schema.description.clone(),
        experimental: schema.is_experimental(),
    })
}

fn split_schema_name(name: &str) -> Result<(&str, &str), GenError> {
    name.split_once('.')
        .ok_or_else(|| GenError::malformed(name, "schema name has no namespace"))
}

/// Whether the referenced named schema carries an experimental stage.
fn ref_schema_is_experimental(ref_path: &str, schemas: &SchemaMap) -> bool {
    let Ok(name) = ref_name(ref_path) else {
        return false;
    };
    let name = name
        .strip_prefix(MAP_PREFIX)
        .or_else(|| name.strip_prefix(LIST_PREFIX))
        .unwrap_or(name);
    schemas.get(name).is_some_and(Schema::is_experimental)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::schema::model::SchemaDocument;

    fn config() -> GeneratorConfig {
        GeneratorConfig::standard()
    }

    fn parse(json: &str) -> SchemaMap {
        SchemaDocument::from_json(json).unwrap().defs
    }

    #[test]
    fn test_generate_type_primitive() {
        let ty = generate_type("#/$defs/string", false, &config()).unwrap();
        assert_eq!(ty, GeneratedType::primitive("str"));
    }

    #[test]
    fn test_generate_type_map_of_string() {
        let ty = generate_type("#/$defs/map/string", false, &config()).unwrap();
        assert_eq!(ty.render(), "Dict[str, str]");
    }

    #[test]
    fn test_generate_type_nested_container() {
        let ty = generate_type("#/$defs/map/list/jobs.Task", false, &config()).unwrap();
        assert_eq!(ty.render(), "Dict[str, List[Task]]");
        let param = generate_type("#/$defs/map/list/jobs.Task", true, &config()).unwrap();
        assert_eq!(param.render(), "Dict[str, List[TaskParam]]");
    }

    #[test]
    fn test_generate_type_param_alias() {
        let ty = generate_type("#/$defs/jobs.Task", true, &config()).unwrap();
        assert_eq!(ty.name, "TaskParam");
        assert_eq!(
            ty.package.as_deref(),
            Some("databricks.bundles.jobs._models.task")
        );
    }

    #[test]
    fn test_dataclass_fields_in_declaration_order() {
        let schemas = parse(
            r##"{
              "$defs": {
                "jobs.Task": {
                  "type": "object",
                  "properties": {
                    "notebook_path": { "$ref": "#/$defs/string" },
                    "task_key": { "$ref": "#/$defs/string" },
                    "max_retries": { "$ref": "#/$defs/integer" }
                  },
                  "required": ["task_key"]
                }
              }
            }"##,
        );
        let models = generate_models(&schemas, &config()).unwrap();
        let GeneratedModel::Dataclass(task) = &models["jobs.Task"] else {
            panic!("expected dataclass");
        };

        // Declaration order, not required-first: reordering is a later pass
        let names: Vec<_> = task.fields.iter().map(|f| f.field_name.as_str()).collect();
        assert_eq!(names, ["notebook_path", "task_key", "max_retries"]);

        assert!(!task.fields[0].is_required());
        assert_eq!(task.fields[0].type_name.render(), "Optional[str]");
        assert!(task.fields[1].is_required());
        assert_eq!(task.fields[1].type_name.render(), "str");
        assert_eq!(task.fields[1].param_type_name.render(), "str");
    }

    #[test]
    fn test_optional_collection_gets_factory_default() {
        let schemas = parse(
            r##"{
              "$defs": {
                "jobs.Job": {
                  "type": "object",
                  "properties": {
                    "tasks": { "$ref": "#/$defs/list/jobs.Task" },
                    "tags": { "$ref": "#/$defs/map/string" }
                  }
                }
              }
            }"##,
        );
        let models = generate_models(&schemas, &config()).unwrap();
        let GeneratedModel::Dataclass(job) = &models["jobs.Job"] else {
            panic!("expected dataclass");
        };
        assert_eq!(
            job.fields[0].default,
            FieldDefault::Factory("list".to_string())
        );
        assert_eq!(job.fields[0].type_name.render(), "List[Task]");
        assert_eq!(
            job.fields[1].default,
            FieldDefault::Factory("dict".to_string())
        );
        // Widened create type is still Optional
        assert_eq!(
            job.fields[0].create_func_type_name.render(),
            "Optional[List[TaskParam]]"
        );
    }

    #[test]
    fn test_fields_outside_allow_list_are_dropped() {
        let schemas = parse(
            r##"{
              "$defs": {
                "jobs.Task": {
                  "type": "object",
                  "properties": {
                    "task_key": { "$ref": "#/$defs/string" },
                    "catalog": { "$ref": "#/$defs/catalogs.Catalog" }
                  }
                }
              }
            }"##,
        );
        let models = generate_models(&schemas, &config()).unwrap();
        let GeneratedModel::Dataclass(task) = &models["jobs.Task"] else {
            panic!("expected dataclass");
        };
        assert_eq!(task.fields.len(), 1);
        assert_eq!(task.fields[0].field_name, "task_key");
    }

    #[test]
    fn test_generate_enum() {
        let schemas = parse(
            r##"{
              "$defs": {
                "jobs.Source": {
                  "type": "string",
                  "enum": ["WORKSPACE", "gitSource", "workdayRaas"],
                  "description": "Where the job definition lives."
                }
              }
            }"##,
        );
        let models = generate_models(&schemas, &config()).unwrap();
        let GeneratedModel::Enum(source) = &models["jobs.Source"] else {
            panic!("expected enum");
        };
        assert_eq!(source.class_name, "Source");
        assert_eq!(
            source.values,
            vec![
                ("WORKSPACE".to_string(), "WORKSPACE".to_string()),
                ("GIT_SOURCE".to_string(), "gitSource".to_string()),
                ("WORKDAY_RAAS".to_string(), "workdayRaas".to_string()),
            ]
        );
    }

    #[test]
    fn test_resources_namespace_gets_base_class_and_jobs_package() {
        let schemas = parse(
            r##"{
              "$defs": {
                "resources.Job": {
                  "type": "object",
                  "properties": { "name": { "$ref": "#/$defs/string" } }
                }
              }
            }"##,
        );
        let models = generate_models(&schemas, &config()).unwrap();
        let GeneratedModel::Dataclass(job) = &models["resources.Job"] else {
            panic!("expected dataclass");
        };
        assert_eq!(job.package, "databricks.bundles.jobs._models.job");
        assert_eq!(
            job.extends,
            ["databricks.bundles.core._resource.Resource"]
        );
    }

    #[test]
    fn test_experimental_propagates_to_referencing_fields() {
        let schemas = parse(
            r##"{
              "$defs": {
                "jobs.CleanRoomsTask": {
                  "type": "object",
                  "stage": "preview",
                  "properties": { "notebook_name": { "$ref": "#/$defs/string" } }
                },
                "jobs.Task": {
                  "type": "object",
                  "properties": {
                    "clean_rooms_task": { "$ref": "#/$defs/jobs.CleanRoomsTask" }
                  }
                }
              }
            }"##,
        );
        let models = generate_models(&schemas, &config()).unwrap();
        let GeneratedModel::Dataclass(clean) = &models["jobs.CleanRoomsTask"] else {
            panic!("expected dataclass");
        };
        assert!(clean.experimental);
        let GeneratedModel::Dataclass(task) = &models["jobs.Task"] else {
            panic!("expected dataclass");
        };
        assert!(task.fields[0].experimental);
    }
}
