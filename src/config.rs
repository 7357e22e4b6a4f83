//! Static configuration tables for the generator.
//!
//! All lookup tables are plain data passed explicitly into each pipeline
//! stage, so the whole pipeline stays a pure function of (schema, config).

use indexmap::IndexMap;

/// Immutable configuration for one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root Python package that generated modules live under.
    pub package_root: String,

    /// Primitive ref name to Python type name (e.g. `string` -> `str`).
    pub primitive_renames: IndexMap<String, String>,

    /// Schema namespaces whose generated package differs from the namespace
    /// itself (e.g. `resources` types are generated into `jobs`).
    pub package_overrides: IndexMap<String, String>,

    /// Namespaces that may be loaded. References into any other namespace
    /// are dropped rather than generated.
    pub allowed_namespaces: Vec<String>,

    /// Per-schema property keys to drop before generation. An entry whose
    /// fields are already absent is a stale patch and fails the run.
    pub removed_fields: Vec<(String, Vec<String>)>,

    /// Per-schema field names to union into `required`. An entry that is
    /// already satisfied is a stale patch and fails the run.
    pub extra_required: Vec<(String, Vec<String>)>,

    /// Cycle-breaking set: for each declaring schema, the referenced class
    /// names that must be emitted as deferred (quoted) references.
    pub quoted_refs: Vec<(String, Vec<String>)>,

    /// Base class per namespace, as a fully qualified Python name
    /// (e.g. `databricks.bundles.core._resource.Resource`).
    pub base_classes: IndexMap<String, String>,
}

impl GeneratorConfig {
    /// The table set used for the Databricks bundles schema corpus.
    pub fn standard() -> Self {
        GeneratorConfig {
            package_root: "databricks.bundles".to_string(),
            primitive_renames: [
                ("string", "str"),
                ("integer", "int"),
                ("boolean", "bool"),
                ("number", "float"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            package_overrides: [("resources", "jobs")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            allowed_namespaces: vec![
                "jobs".to_string(),
                "compute".to_string(),
                "resources".to_string(),
            ],
            removed_fields: vec![(
                "jobs.Task".to_string(),
                vec!["dashboard_task".to_string(), "power_bi_task".to_string()],
            )],
            extra_required: vec![(
                "jobs.JobCluster".to_string(),
                vec!["new_cluster".to_string()],
            )],
            quoted_refs: vec![("jobs.ForEachTask".to_string(), vec!["Task".to_string()])],
            base_classes: [(
                "resources".to_string(),
                "databricks.bundles.core._resource.Resource".to_string(),
            )]
            .into_iter()
            .collect(),
        }
    }

    /// An empty table set, useful when generating from ad hoc schemas that
    /// have no patches or cycles.
    pub fn bare(package_root: &str) -> Self {
        GeneratorConfig {
            package_root: package_root.to_string(),
            primitive_renames: Self::standard().primitive_renames,
            package_overrides: IndexMap::new(),
            allowed_namespaces: Vec::new(),
            removed_fields: Vec::new(),
            extra_required: Vec::new(),
            quoted_refs: Vec::new(),
            base_classes: IndexMap::new(),
        }
    }
}
