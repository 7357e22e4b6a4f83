//! Error taxonomy for the generation pipeline.
//!
//! Every error aborts the entire run: this is a build-time tool, and the
//! committed output must never be produced from a half-applied pipeline.

use thiserror::Error;

/// Errors raised by the schema-to-source generation pipeline.
#[derive(Debug, Error)]
pub enum GenError {
    /// The schema document could not be parsed at all.
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured patch would be a no-op against the current schema.
    ///
    /// This is the drift detector: when the upstream schema evolves past a
    /// static patch table, the stale entry must surface as an error instead
    /// of silently doing nothing.
    #[error("stale patch for '{schema}': {detail}")]
    StalePatch { schema: String, detail: String },

    /// A reference inside an allow-listed namespace resolves to neither a
    /// primitive nor a loadable package.
    #[error("unresolvable reference '{0}'")]
    UnresolvableRef(String),

    /// A structural invariant of the schema document is violated.
    #[error("malformed schema '{schema}': {detail}")]
    MalformedSchema { schema: String, detail: String },

    /// The final IR graph contains a reference cycle that is not covered by
    /// the configured cycle-breaking set.
    #[error("unlisted reference cycle: {0}")]
    UnlistedCycle(String),
}

impl GenError {
    pub(crate) fn stale_patch(schema: &str, detail: impl Into<String>) -> Self {
        GenError::StalePatch {
            schema: schema.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(schema: &str, detail: impl Into<String>) -> Self {
        GenError::MalformedSchema {
            schema: schema.to_string(),
            detail: detail.into(),
        }
    }
}
