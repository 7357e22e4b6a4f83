//! Schema-level patch passes applied before generation.
//!
//! Each pass takes the full schema map and returns a new one. A configured
//! patch that turns out to be a no-op is a hard error: if the upstream
//! schema evolved past a static table entry, a human has to notice.

use tracing::debug;

use crate::error::GenError;
use crate::schema::model::SchemaMap;

/// Drop the listed property keys from each named schema.
///
/// Fails with [`GenError::StalePatch`] if a schema or a listed field is
/// already absent.
pub fn remove_unsupported_fields(
    schemas: &SchemaMap,
    table: &[(String, Vec<String>)],
) -> Result<SchemaMap, GenError> {
    let mut out = schemas.clone();
    for (name, fields) in table {
        let Some(schema) = out.get_mut(name) else {
            return Err(GenError::stale_patch(name, "schema no longer exists"));
        };
        for field in fields {
            if schema.properties.shift_remove(field).is_none() {
                return Err(GenError::stale_patch(
                    name,
                    format!("field '{field}' is already absent"),
                ));
            }
            schema.required.retain(|required| required != field);
            debug!(schema = %name, field = %field, "Removed unsupported field.");
        }
    }
    Ok(out)
}

/// Union extra field names into each named schema's `required` list.
///
/// Fails with [`GenError::StalePatch`] if a schema is missing or any listed
/// field is already required, and with [`GenError::MalformedSchema`] if a
/// listed field does not exist in `properties`.
pub fn add_extra_required_fields(
    schemas: &SchemaMap,
    table: &[(String, Vec<String>)],
) -> Result<SchemaMap, GenError> {
    let mut out = schemas.clone();
    for (name, fields) in table {
        let Some(schema) = out.get_mut(name) else {
            return Err(GenError::stale_patch(name, "schema no longer exists"));
        };
        for field in fields {
            if schema.required.contains(field) {
                return Err(GenError::stale_patch(
                    name,
                    format!("field '{field}' is already required"),
                ));
            }
            if !schema.properties.contains_key(field) {
                return Err(GenError::malformed(
                    name,
                    format!("cannot require unknown field '{field}'"),
                ));
            }
            schema.required.push(field.clone());
            debug!(schema = %name, field = %field, "Added required field.");
        }
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::model::SchemaDocument;

    fn fixture() -> SchemaMap {
        let json = r##"{
          "$defs": {
            "jobs.Task": {
              "type": "object",
              "properties": {
                "task_key": { "$ref": "#/$defs/string" },
                "legacy_task": { "$ref": "#/$defs/jobs.LegacyTask" },
                "retries": { "$ref": "#/$defs/integer" }
              },
              "required": ["task_key", "legacy_task"]
            }
          }
        }"##;
        SchemaDocument::from_json(json).unwrap().defs
    }

    #[test]
    fn test_remove_unsupported_fields() {
        let schemas = fixture();
        let table = vec![("jobs.Task".to_string(), vec!["legacy_task".to_string()])];
        let patched = remove_unsupported_fields(&schemas, &table).unwrap();

        let task = &patched["jobs.Task"];
        assert!(!task.properties.contains_key("legacy_task"));
        // The removed field also leaves the required list
        assert_eq!(task.required, ["task_key"]);
        // The input map is untouched
        assert!(schemas["jobs.Task"].properties.contains_key("legacy_task"));
    }

    #[test]
    fn test_remove_absent_field_is_stale() {
        let schemas = fixture();
        let table = vec![("jobs.Task".to_string(), vec!["gone".to_string()])];
        let err = remove_unsupported_fields(&schemas, &table).unwrap_err();
        assert!(matches!(err, GenError::StalePatch { .. }));
    }

    #[test]
    fn test_remove_from_unknown_schema_is_stale() {
        let schemas = fixture();
        let table = vec![("jobs.Ghost".to_string(), vec!["x".to_string()])];
        let err = remove_unsupported_fields(&schemas, &table).unwrap_err();
        assert!(matches!(err, GenError::StalePatch { .. }));
    }

    #[test]
    fn test_add_extra_required_fields() {
        let schemas = fixture();
        let table = vec![("jobs.Task".to_string(), vec!["retries".to_string()])];
        let patched = add_extra_required_fields(&schemas, &table).unwrap();
        assert_eq!(
            patched["jobs.Task"].required,
            ["task_key", "legacy_task", "retries"]
        );
    }

    #[test]
    fn test_add_already_required_field_is_stale() {
        let schemas = fixture();
        let table = vec![("jobs.Task".to_string(), vec!["task_key".to_string()])];
        let err = add_extra_required_fields(&schemas, &table).unwrap_err();
        assert!(matches!(err, GenError::StalePatch { .. }));
    }

    #[test]
    fn test_add_unknown_field_is_malformed() {
        let schemas = fixture();
        let table = vec![("jobs.Task".to_string(), vec!["ghost".to_string()])];
        let err = add_extra_required_fields(&schemas, &table).unwrap_err();
        assert!(matches!(err, GenError::MalformedSchema { .. }));
    }
}
