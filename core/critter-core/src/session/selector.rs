//! Selection of the single monitored session.
//!
//! Under `AnyActive` the most interesting session wins: highest activity
//! priority, then most recent update. Pure recency would let a passively
//! idle session that just wrote a heartbeat outrank one mid-tool-call.
//!
//! Two sessions at equal priority can jostle for "most recent" every tick,
//! so the selector keeps a hysteresis anchor: the previous pick is kept for
//! `stickiness_secs` as long as it is still live and not outranked. The
//! displayed selection may lag by a few seconds; in exchange it does not
//! flicker.

use crate::types::{SelectionMode, SessionRecord};

#[derive(Debug, Clone)]
struct Anchor {
    session_id: String,
    selected_at: f64,
}

/// Picks the monitored session from the set of currently valid ones.
#[derive(Debug)]
pub struct SessionSelector {
    last_selected: Option<Anchor>,
    stickiness_secs: f64,
}

impl SessionSelector {
    pub fn new(stickiness_secs: f64) -> Self {
        Self {
            last_selected: None,
            stickiness_secs,
        }
    }

    /// Applies `mode` to `sessions`, returning the record to monitor.
    ///
    /// `now` is Unix epoch seconds; the hysteresis anchor only moves under
    /// `AnyActive`.
    pub fn select(
        &mut self,
        sessions: &[SessionRecord],
        mode: &SelectionMode,
        focused_tty: Option<&str>,
        now: f64,
    ) -> Option<SessionRecord> {
        match mode {
            SelectionMode::Specific { session_id } => sessions
                .iter()
                .find(|s| &s.session_id == session_id)
                .cloned(),
            SelectionMode::FollowFocusedTerminal => {
                let focused = focused_tty?;
                sessions
                    .iter()
                    .find(|s| s.tty.as_deref() == Some(focused))
                    .cloned()
            }
            SelectionMode::AnyActive => self.select_any_active(sessions, now),
        }
    }

    fn select_any_active(&mut self, sessions: &[SessionRecord], now: f64) -> Option<SessionRecord> {
        let mut candidates: Vec<&SessionRecord> = sessions.iter().collect();
        candidates.sort_by(|a, b| {
            b.status
                .activity_priority()
                .cmp(&a.status.activity_priority())
                .then(b.timestamp.total_cmp(&a.timestamp))
        });

        let top = match candidates.first() {
            Some(top) => *top,
            None => return None,
        };

        if let Some(anchor) = &self.last_selected {
            if now - anchor.selected_at < self.stickiness_secs {
                if let Some(previous) = sessions.iter().find(|s| s.session_id == anchor.session_id)
                {
                    if previous.status.activity_priority() >= top.status.activity_priority() {
                        return Some(previous.clone());
                    }
                }
            }
        }

        self.last_selected = Some(Anchor {
            session_id: top.session_id.clone(),
            selected_at: now,
        });
        Some(top.clone())
    }

    /// Forgets the hysteresis anchor.
    pub fn reset(&mut self) {
        self.last_selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionStatus;

    const NOW: f64 = 1_700_000_000.0;

    fn record(id: &str, status: SessionStatus, timestamp: f64) -> SessionRecord {
        SessionRecord {
            session_id: id.to_string(),
            status,
            timestamp,
            working_directory: None,
            tty: None,
            tool_name: None,
            tab_title: None,
        }
    }

    fn with_tty(mut r: SessionRecord, tty: &str) -> SessionRecord {
        r.tty = Some(tty.to_string());
        r
    }

    #[test]
    fn test_empty_set_selects_nothing() {
        let mut selector = SessionSelector::new(5.0);
        assert!(selector
            .select(&[], &SelectionMode::AnyActive, None, NOW)
            .is_none());
    }

    #[test]
    fn test_priority_beats_recency() {
        let mut selector = SessionSelector::new(5.0);
        let sessions = vec![
            record("idle", SessionStatus::Idle, NOW),
            record("thinking", SessionStatus::Thinking, NOW - 100.0),
            record("tools", SessionStatus::Tools, NOW - 50.0),
        ];
        let picked = selector
            .select(&sessions, &SelectionMode::AnyActive, None, NOW)
            .unwrap();
        assert_eq!(picked.session_id, "thinking");
    }

    #[test]
    fn test_recency_breaks_priority_ties() {
        let mut selector = SessionSelector::new(5.0);
        let sessions = vec![
            record("older", SessionStatus::Thinking, NOW - 10.0),
            record("newer", SessionStatus::Thinking, NOW - 1.0),
        ];
        let picked = selector
            .select(&sessions, &SelectionMode::AnyActive, None, NOW)
            .unwrap();
        assert_eq!(picked.session_id, "newer");
    }

    #[test]
    fn test_hysteresis_holds_equal_priority_rival() {
        let mut selector = SessionSelector::new(5.0);
        let a = record("a", SessionStatus::Thinking, NOW);
        let b = record("b", SessionStatus::Thinking, NOW - 5.0);

        let picked = selector
            .select(
                &[a.clone(), b.clone()],
                &SelectionMode::AnyActive,
                None,
                NOW,
            )
            .unwrap();
        assert_eq!(picked.session_id, "a");

        // One second later B has the fresher heartbeat, but A sticks.
        let b_newer = record("b", SessionStatus::Thinking, NOW + 1.0);
        let picked = selector
            .select(
                &[a.clone(), b_newer.clone()],
                &SelectionMode::AnyActive,
                None,
                NOW + 1.0,
            )
            .unwrap();
        assert_eq!(picked.session_id, "a");

        // Past the stickiness interval the selector is free to move.
        let picked = selector
            .select(&[a, b_newer], &SelectionMode::AnyActive, None, NOW + 6.0)
            .unwrap();
        assert_eq!(picked.session_id, "b");
    }

    #[test]
    fn test_hysteresis_yields_to_higher_priority() {
        let mut selector = SessionSelector::new(5.0);
        let a = record("a", SessionStatus::Waiting, NOW);
        selector
            .select(&[a.clone()], &SelectionMode::AnyActive, None, NOW)
            .unwrap();

        // A new thinking session outranks the anchored waiting one
        // immediately; stickiness only defends against equal-priority churn.
        let b = record("b", SessionStatus::Thinking, NOW + 1.0);
        let picked = selector
            .select(&[a, b], &SelectionMode::AnyActive, None, NOW + 1.0)
            .unwrap();
        assert_eq!(picked.session_id, "b");
    }

    #[test]
    fn test_hysteresis_ignores_vanished_previous() {
        let mut selector = SessionSelector::new(5.0);
        let a = record("a", SessionStatus::Thinking, NOW);
        selector
            .select(&[a], &SelectionMode::AnyActive, None, NOW)
            .unwrap();

        let b = record("b", SessionStatus::Thinking, NOW + 1.0);
        let picked = selector
            .select(&[b], &SelectionMode::AnyActive, None, NOW + 1.0)
            .unwrap();
        assert_eq!(picked.session_id, "b");
    }

    #[test]
    fn test_specific_returns_exact_match_or_nothing() {
        let mut selector = SessionSelector::new(5.0);
        let sessions = vec![
            record("a", SessionStatus::Idle, NOW),
            record("b", SessionStatus::Thinking, NOW),
        ];
        let mode = SelectionMode::Specific {
            session_id: "a".to_string(),
        };
        let picked = selector.select(&sessions, &mode, None, NOW).unwrap();
        assert_eq!(picked.session_id, "a");

        let missing = SelectionMode::Specific {
            session_id: "zzz".to_string(),
        };
        assert!(selector.select(&sessions, &missing, None, NOW).is_none());
    }

    #[test]
    fn test_follow_focused_terminal_matches_tty() {
        let mut selector = SessionSelector::new(5.0);
        let sessions = vec![
            with_tty(record("a", SessionStatus::Idle, NOW), "/dev/ttys001"),
            with_tty(record("b", SessionStatus::Thinking, NOW), "/dev/ttys002"),
        ];
        let mode = SelectionMode::FollowFocusedTerminal;

        let picked = selector
            .select(&sessions, &mode, Some("/dev/ttys001"), NOW)
            .unwrap();
        assert_eq!(picked.session_id, "a");

        assert!(selector.select(&sessions, &mode, None, NOW).is_none());
        assert!(selector
            .select(&sessions, &mode, Some("/dev/ttys009"), NOW)
            .is_none());
    }

    #[test]
    fn test_reset_forgets_anchor() {
        let mut selector = SessionSelector::new(5.0);
        let a = record("a", SessionStatus::Thinking, NOW);
        let b = record("b", SessionStatus::Thinking, NOW + 1.0);
        selector
            .select(&[a.clone(), b.clone()], &SelectionMode::AnyActive, None, NOW)
            .unwrap();

        selector.reset();
        let picked = selector
            .select(&[a, b], &SelectionMode::AnyActive, None, NOW + 1.0)
            .unwrap();
        assert_eq!(picked.session_id, "b");
    }
}
