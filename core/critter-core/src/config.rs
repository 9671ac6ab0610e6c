//! Monitor configuration and sessions-directory paths.
//!
//! Production code uses `MonitorConfig::new()` which points at
//! `~/.critter/sessions`. Tests inject a temp dir via `with_sessions_dir`.
//!
//! The timing constants were chosen empirically in the original product;
//! they are carried here as named, overridable fields rather than re-derived.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Suffix that distinguishes status files from anything else that ends up in
/// the sessions directory.
pub const STATUS_FILE_SUFFIX: &str = ".status.json";

/// Configuration for a `SessionMonitor` instance.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Directory holding one status file per session.
    pub sessions_dir: PathBuf,
    /// Delay between poll ticks.
    pub poll_interval: Duration,
    /// Maximum age for a record in an active status (thinking/tools/
    /// planning/waiting) before it is treated as abandoned.
    pub active_staleness_secs: f64,
    /// Records stamped earlier than `monitor start - grace` are left over
    /// from before this process launched and must not resurrect as "working".
    pub start_grace_secs: f64,
    /// Minimum time the selector sticks with its previous pick when an
    /// equal-priority rival overtakes it on recency.
    pub stickiness_secs: f64,
    /// Age limit for records with no TTY witness; generous because such
    /// sessions cannot be actively verified.
    pub no_tty_timeout_secs: f64,
}

impl MonitorConfig {
    /// Resolves the default configuration under the user's home directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_sessions_dir(default_sessions_dir()?))
    }

    /// Creates a configuration rooted at a custom sessions directory.
    /// Used for testing with temp directories.
    pub fn with_sessions_dir(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            poll_interval: Duration::from_secs(2),
            active_staleness_secs: 300.0,
            start_grace_secs: 2.0,
            stickiness_secs: 5.0,
            no_tty_timeout_secs: 3600.0,
        }
    }

    /// Path of the status file for one session id.
    pub fn status_file_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir
            .join(format!("{session_id}{STATUS_FILE_SUFFIX}"))
    }
}

/// Returns the default sessions directory (`~/.critter/sessions`).
pub fn default_sessions_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(MonitorError::HomeDirNotFound)?;
    Ok(home.join(".critter").join("sessions"))
}

/// Whether a directory entry name looks like a status file.
pub fn is_status_file_name(name: &str) -> bool {
    name.ends_with(STATUS_FILE_SUFFIX)
}

/// Strips the status suffix, yielding the fallback session id for files that
/// omit `session_id` in their payload.
pub fn file_stem(name: &str) -> &str {
    name.strip_suffix(STATUS_FILE_SUFFIX).unwrap_or(name)
}
