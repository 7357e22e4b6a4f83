#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Generates strongly-typed Python data bindings from a JSON schema
//! document.
//!
//! The pipeline is a pure function of (schema, [`GeneratorConfig`]):
//!
//! 1. parse the schema document ([`schema::model`])
//! 2. apply schema patches ([`schema::patch`])
//! 3. build per-type IR ([`ir::generate`])
//! 4. apply IR passes: quoting, field reordering, cycle checking
//!    ([`ir::passes`])
//! 5. render deterministic source text ([`ir::codegen`])
//!
//! Patches fail loudly when they no longer apply, so configuration tables
//! cannot silently rot as the schema evolves.

pub mod config;
pub mod error;
pub mod ir;
pub mod schema;

pub use config::GeneratorConfig;
pub use error::GenError;
pub use ir::{GeneratedFile, IrMap};
pub use schema::SchemaDocument;

use tracing::info;

use crate::ir::passes;
use crate::schema::patch;

/// Run the full pipeline: schema JSON in, rendered source files out.
///
/// Output order and content are a deterministic function of the inputs.
pub fn generate(
    schema_json: &str,
    config: &GeneratorConfig,
) -> Result<Vec<GeneratedFile>, GenError> {
    let document = SchemaDocument::from_json(schema_json)?;
    let schemas = patch::remove_unsupported_fields(&document.defs, &config.removed_fields)?;
    let schemas = patch::add_extra_required_fields(&schemas, &config.extra_required)?;

    let models = ir::generate_models(&schemas, config)?;
    let models = passes::quote_recursive_refs(models, config)?;
    let models = passes::reorder_required_fields(models);
    passes::assert_no_unlisted_cycles(&models)?;

    let files = ir::render_files(&models, config);
    info!(files = files.len(), "Generated data bindings.");
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SCHEMA_JSON: &str = r##"{
        "$defs": {
            "jobs.Task": {
                "type": "object",
                "description": "A unit of work within a job.",
                "properties": {
                    "notebook_path": {"$ref": "#/$defs/string"},
                    "task_key": {"$ref": "#/$defs/string"},
                    "max_retries": {"$ref": "#/$defs/integer"}
                },
                "required": ["task_key"]
            },
            "jobs.Source": {
                "type": "string",
                "enum": ["WORKSPACE", "GIT"]
            }
        }
    }"##;

    fn config() -> GeneratorConfig {
        let mut config = GeneratorConfig::bare("databricks.bundles");
        config.allowed_namespaces = vec!["jobs".to_string()];
        config
    }

    #[test]
    fn test_generate_end_to_end() {
        let files = generate(SCHEMA_JSON, &config()).unwrap();
        assert_eq!(files.len(), 2);

        let task = &files[0];
        assert_eq!(task.path, "databricks/bundles/jobs/_models/task.py");
        assert!(task.contents.contains("@dataclass(kw_only=True)\nclass Task:\n"));
        // Required field reordered ahead of the optional ones.
        let key_pos = task.contents.find("task_key: str").unwrap();
        let path_pos = task.contents.find("notebook_path: Optional[str]").unwrap();
        assert!(key_pos < path_pos);
        assert!(task.contents.contains("TaskParam = TaskDict | Task\n"));

        let source = &files[1];
        assert_eq!(source.path, "databricks/bundles/jobs/_models/source.py");
        assert!(source.contents.contains("class Source(Enum):\n"));
        assert!(
            source
                .contents
                .contains("SourceParam = Literal[\"WORKSPACE\", \"GIT\"] | Source\n")
        );
    }

    #[test]
    fn test_generate_minimal_single_model() {
        let json = r##"{
            "$defs": {
                "jobs.Task": {
                    "type": "object",
                    "properties": {
                        "task_key": {"$ref": "#/$defs/string"}
                    },
                    "required": ["task_key"]
                }
            }
        }"##;
        let files = generate(json, &config()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "databricks/bundles/jobs/_models/task.py");
        assert!(files[0].contents.contains("class Task:\n"));
        assert!(files[0].contents.contains("    task_key: str\n"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let first = generate(SCHEMA_JSON, &config()).unwrap();
        let second = generate(SCHEMA_JSON, &config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_rejects_stale_patch() {
        let mut config = config();
        config.removed_fields = vec![(
            "jobs.Task".to_string(),
            vec!["no_such_field".to_string()],
        )];
        let err = generate(SCHEMA_JSON, &config).unwrap_err();
        assert!(matches!(err, GenError::StalePatch { .. }));
    }
}
