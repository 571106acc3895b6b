use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the server configuration core.
/// Every fallible operation returns `Result<T, ServerError>`.
#[derive(Debug, Error)]
pub enum ServerError {
    // ── Configuration ───────────────────────────────────
    #[error("Server configuration not found: {path:?}")]
    ConfigNotFound { path: PathBuf },

    #[error("Server already exists: {0}")]
    ServerAlreadyExists(String),

    #[error("Server is not bound to a directory")]
    Unbound,

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Properties ──────────────────────────────────────
    #[error("Properties file parse error - {0}")]
    Parse(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ServerError::Io {
            path: path.into(),
            source,
        }
    }
}
