//! Fatal configuration errors.
//!
//! Per-artifact and per-candidate problems are collected as [`Finding`]s on
//! the receipt instead; only errors that make the invocation itself
//! meaningless abort before file I/O.
//!
//! [`Finding`]: crate::finding::Finding

/// Errors that abort a run before any validation output is produced.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The discovery root does not exist or is not a directory.
    #[error("artifacts root is not a directory: {0}")]
    InvalidRoot(String),

    /// Required artifact paths were neither supplied nor derivable.
    #[error("missing required artifact paths: {0}")]
    MissingPaths(String),

    /// Mutually inconsistent flag combination.
    #[error("conflicting flags: {0}")]
    ConflictingFlags(String),

    /// Failed to read a file the invocation itself depends on.
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a receipt or report.
    #[error("failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Receipt serialization failure.
    #[error("failed to serialize receipt")]
    Serialize(#[from] serde_json::Error),
}

impl GateError {
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.display().to_string(),
            source,
        }
    }
}
