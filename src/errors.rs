//! Unified error type for the analysis pipeline.
//!
//! Categorizes failures the way the CLI and library callers need to react to
//! them: some abort the whole run (`Io`, `Format`, `Config`), some are
//! per-sheet and recorded rather than propagated (handled at the call site,
//! not modeled here), and `Cancelled` is a status, not a failure.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BoqError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unrecognized workbook format: {0}")]
    UnrecognizedFormat(String),

    #[error("workbook exceeds configured size limit: {size_bytes} bytes > {limit_bytes} bytes")]
    OverSizeLimit { size_bytes: u64, limit_bytes: u64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("category dictionary error: {0}")]
    Dictionary(String),

    #[error("review artifact is malformed: {0}")]
    ReviewArtifact(String),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, BoqError>;

impl BoqError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short user-facing message with an actionable suggestion, per the
    /// error-handling policy: detailed diagnostics stay in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { path, .. } => {
                format!(
                    "Could not read '{}'. Check the path and file permissions.",
                    path.display()
                )
            }
            Self::UnrecognizedFormat(fmt) => {
                format!("'{fmt}' is not a supported workbook format.")
            }
            Self::OverSizeLimit { .. } => {
                "File is larger than the configured size limit; raise `processing_limits.max_file_size_mb` or split the workbook.".to_string()
            }
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Dictionary(msg) => format!("Category dictionary problem: {msg}"),
            Self::ReviewArtifact(msg) => format!("Review artifact problem: {msg}"),
            Self::Cancelled => "Operation was cancelled.".to_string(),
        }
    }
}
