//! Decoding of one on-disk status file into a `SessionRecord`.
//!
//! The hook is the authoritative writer; this module only reads. Decoding is
//! strict about `status` and `timestamp` and lenient about everything else:
//! a missing `session_id` falls back to the file stem. Since the writer is
//! not ours to synchronize with, malformed bytes are an expected input
//! (the file may be mid-write) and surface as `MonitorError::Parse`, which
//! the orchestrator treats as "skip this tick, do not delete".

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::types::{SessionRecord, SessionStatus};

/// Wire format of a status file, shared with the hook writer.
///
/// ```json
/// {
///   "status": "thinking",
///   "timestamp": 1761234567.25,
///   "session_id": "8e11bfb5-...",
///   "tool_name": "Bash",
///   "cwd": "/Users/pete/Code/my-project",
///   "tty": "/dev/ttys003"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: SessionStatus,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tty: Option<String>,
}

/// Parses raw file bytes, using `fallback_id` (the file stem) when the
/// payload omits its session id.
pub fn parse_record(bytes: &[u8], fallback_id: &str) -> Result<SessionRecord> {
    let payload: StatusPayload =
        serde_json::from_slice(bytes).map_err(|source| MonitorError::Parse {
            context: fallback_id.to_string(),
            source,
        })?;

    Ok(SessionRecord {
        session_id: payload
            .session_id
            .unwrap_or_else(|| fallback_id.to_string()),
        status: payload.status,
        timestamp: payload.timestamp,
        working_directory: payload.cwd,
        tty: payload.tty,
        tool_name: payload.tool_name,
        tab_title: None,
    })
}
