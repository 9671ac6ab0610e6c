//! Derives one-shot events from the monitor's status stream.
//!
//! The orchestrator debounces, so every call here carries a real change in
//! `(is_active, status, session_id)`, but a change of *focus* (same session
//! status, different monitored session) must not retrigger sounds. This
//! handler tracks the last-seen status per session id and emits
//! `AskedQuestion`/`Completed` exactly once per work cycle, guarded by
//! per-session flags that only a fresh working status clears.

use std::collections::HashMap;

use crate::types::SessionStatus;

/// Signals derived from one status change.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionSignal {
    /// The session stopped working to ask the user something.
    AskedQuestion { session_id: String },
    /// The session finished a work cycle.
    Completed { session_id: String },
    /// Unconditional redraw hint carrying the raw status; emitted for every
    /// event so idle-state and tab-switch redraws both work.
    Refresh {
        is_active: bool,
        status: Option<SessionStatus>,
        session_id: Option<String>,
    },
}

#[derive(Debug)]
struct Tracked {
    last_status: SessionStatus,
    question_notified: bool,
    completion_notified: bool,
}

/// Stateful consumer of the orchestrator's "status changed" events.
#[derive(Debug, Default)]
pub struct TransitionHandler {
    sessions: HashMap<String, Tracked>,
}

impl TransitionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one status-changed event, returning the derived signals.
    /// The trailing element is always a `Refresh`.
    pub fn process(
        &mut self,
        is_active: bool,
        status: Option<&SessionStatus>,
        session_id: Option<&str>,
    ) -> Vec<TransitionSignal> {
        let mut signals = Vec::new();

        if let (Some(status), Some(session_id)) = (status, session_id) {
            self.process_session(status, session_id, &mut signals);
        }

        signals.push(TransitionSignal::Refresh {
            is_active,
            status: status.cloned(),
            session_id: session_id.map(|s| s.to_string()),
        });
        signals
    }

    fn process_session(
        &mut self,
        status: &SessionStatus,
        session_id: &str,
        signals: &mut Vec<TransitionSignal>,
    ) {
        if !self.sessions.contains_key(session_id) {
            self.sessions.insert(
                session_id.to_string(),
                Tracked {
                    last_status: status.clone(),
                    question_notified: false,
                    completion_notified: false,
                },
            );
            return;
        }

        let entry = match self.sessions.get_mut(session_id) {
            Some(entry) => entry,
            None => return,
        };
        if entry.last_status == *status {
            // Same state, different focus (the UI switched which session it
            // displays). Refresh only.
            return;
        }

        let was_working = entry.last_status.is_working();

        if status.is_working() {
            // A fresh work cycle: both one-shot guards rearm.
            entry.question_notified = false;
            entry.completion_notified = false;
        } else if was_working && *status == SessionStatus::Waiting && !entry.question_notified {
            entry.question_notified = true;
            signals.push(TransitionSignal::AskedQuestion {
                session_id: session_id.to_string(),
            });
        } else if was_working && *status == SessionStatus::Idle && !entry.completion_notified {
            entry.completion_notified = true;
            signals.push(TransitionSignal::Completed {
                session_id: session_id.to_string(),
            });
        }

        entry.last_status = status.clone();
    }

    /// Wipes all per-session bookkeeping. Called when the consumer enters an
    /// unrelated mode (e.g. sleep) so stale flags cannot fire on resume.
    pub fn clear_tracking(&mut self) {
        self.sessions.clear();
    }
}
