//! Error types for critter-core operations.
//!
//! The taxonomy is deliberately small. Parse failures mean "skip this file
//! for a tick, it may be mid-write". Filesystem failures are swallowed by
//! the orchestrator and degrade to "no change this cycle"; they carry
//! context here so the log line says which operation failed. Staleness is a
//! classification outcome, not an error (see `session::liveness`).

/// All errors that can occur in critter-core operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Home directory could not be resolved")]
    HomeDirNotFound,

    #[error("Malformed status file: {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using MonitorError.
pub type Result<T> = std::result::Result<T, MonitorError>;
