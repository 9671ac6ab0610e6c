//! Core types shared across the monitor pipeline.
//!
//! The status vocabulary mirrors what the hook writes into status files.
//! Unknown strings are preserved as `Other` rather than rejected, so a newer
//! hook can introduce a status without breaking an older monitor.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The activity reported by a session's status file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    Thinking,
    Tools,
    Planning,
    Waiting,
    Idle,
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Thinking => "thinking",
            SessionStatus::Tools => "tools",
            SessionStatus::Planning => "planning",
            SessionStatus::Waiting => "waiting",
            SessionStatus::Idle => "idle",
            SessionStatus::Other(value) => value.as_str(),
        }
    }

    /// Rank used to decide which session is most worth showing.
    /// Higher wins; recency breaks ties.
    pub fn activity_priority(&self) -> u8 {
        match self {
            SessionStatus::Thinking | SessionStatus::Planning => 4,
            SessionStatus::Tools => 3,
            SessionStatus::Waiting => 2,
            SessionStatus::Idle => 1,
            SessionStatus::Other(_) => 0,
        }
    }

    /// Whether this status counts as mid-work for transition tracking.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            SessionStatus::Thinking | SessionStatus::Tools | SessionStatus::Planning
        )
    }
}

impl From<String> for SessionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "thinking" => SessionStatus::Thinking,
            "tools" => SessionStatus::Tools,
            "planning" => SessionStatus::Planning,
            "waiting" => SessionStatus::Waiting,
            "idle" => SessionStatus::Idle,
            _ => SessionStatus::Other(value),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(value: SessionStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Which session the monitor should follow.
///
/// Persisted by the caller across restarts; the monitor itself never writes
/// it to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMode {
    /// Follow whichever live session currently ranks highest.
    #[default]
    AnyActive,
    /// Follow the session whose TTY matches the focused terminal.
    FollowFocusedTerminal,
    /// Pin to one session id. Falls back to `AnyActive` if it disappears.
    Specific { session_id: String },
}

/// Immutable snapshot of one session, parsed from its status file.
///
/// `tab_title` is never on disk; it is supplied later by the terminal-focus
/// collaborator, keyed by TTY.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub status: SessionStatus,
    /// Unix epoch seconds of the last hook update. Assigned by the hook,
    /// not by this crate.
    pub timestamp: f64,
    pub working_directory: Option<String>,
    pub tty: Option<String>,
    pub tool_name: Option<String>,
    pub tab_title: Option<String>,
}

impl SessionRecord {
    /// Human-facing label: project directory name (or a shortened id) plus
    /// the terminal tab title when one has been resolved.
    pub fn display_name(&self) -> String {
        let project = self
            .working_directory
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.short_id());
        let title = self.tab_title.as_deref().unwrap_or("Session");
        format!("{project} — {title}")
    }

    fn short_id(&self) -> String {
        self.session_id.chars().take(8).collect()
    }
}
