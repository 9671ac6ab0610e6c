//! Liveness classification for parsed session records.
//!
//! A record is either still worth showing (`Valid`) or abandoned (`Stale`,
//! meaning its backing file should be deleted). Unparseable files never get
//! this far; the orchestrator skips them at parse time because they may be
//! mid-write.
//!
//! Rules, in order:
//!
//! 1. A record naming a TTY whose device node is gone is `Stale`: the
//!    terminal closed, regardless of status or age.
//! 2. A record with no TTY witness that has not updated within
//!    `no_tty_timeout_secs` is `Stale`. The timeout is generous because such
//!    sessions cannot be actively verified.
//! 3. Idle records are otherwise always live.
//! 4. Records in an active status must be fresh (within
//!    `active_staleness_secs`) AND not predate this monitor's own startup
//!    (minus a small grace for clock/write races). The second clause stops a
//!    pre-existing "thinking" snapshot from resurrecting as "still working"
//!    when the pet relaunches.

use std::path::Path;

use crate::config::MonitorConfig;
use crate::types::{SessionRecord, SessionStatus};

/// Outcome of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Stale,
}

/// Classifies `record` against the rules above.
///
/// `monitor_started_at` and `now` are Unix epoch seconds, matching the
/// timestamps the hook writes.
pub fn classify(
    record: &SessionRecord,
    config: &MonitorConfig,
    monitor_started_at: f64,
    now: f64,
) -> Verdict {
    let age = now - record.timestamp;

    match record.tty.as_deref() {
        Some(tty) if !tty.is_empty() => {
            if !Path::new(tty).exists() {
                return Verdict::Stale;
            }
        }
        _ => {
            if age > config.no_tty_timeout_secs {
                return Verdict::Stale;
            }
        }
    }

    if record.status == SessionStatus::Idle {
        return Verdict::Valid;
    }

    let fresh = age <= config.active_staleness_secs;
    let post_startup = record.timestamp >= monitor_started_at - config.start_grace_secs;
    if fresh && post_startup {
        Verdict::Valid
    } else {
        Verdict::Stale
    }
}
