//! Error taxonomy for compliance report generation.

use std::path::PathBuf;

/// Errors produced while reading scans and writing the report.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceError {
    #[error("no input files were supplied")]
    NoInputs,

    #[error("could not read input {path:?}: {source}")]
    InputNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is not well-formed XML: {detail}")]
    Parse { path: PathBuf, detail: String },

    /// Recoverable: the extractor substitutes an empty value and logs this.
    #[error("host {host}: compliance item is missing field {field}")]
    MissingField { host: String, field: String },

    #[error("could not write report {path:?}: {detail}")]
    FileWrite { path: PathBuf, detail: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ComplianceError {
    /// Attach a source path to a parse failure raised before the path was known.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ComplianceError::Parse { detail, .. } => ComplianceError::Parse {
                path: path.into(),
                detail,
            },
            other => other,
        }
    }
}

/// Result type for compliance operations.
pub type Result<T> = std::result::Result<T, ComplianceError>;
