//! The monitor orchestrator: poll loop, scan cycle, and debounced events.
//!
//! `SessionMonitor` is an explicitly constructed, explicitly owned service:
//! whoever owns the UI lifecycle owns it. There is no global instance and no
//! process-wide pub/sub; subscribers get a typed observer passed in at
//! construction.
//!
//! Threading contract: one background thread runs the poll loop
//! (immediate-then-interval). Each tick executes a full scan as one unit of
//! work under the state mutex, so at most one scan is in flight and readers
//! never observe a half-applied cycle. Callbacks fire on the scan thread,
//! after the lock is released, and only when something actually changed;
//! subscribers must never see a callback for a no-op cycle.
//!
//! Failure policy: nothing here propagates errors to subscribers. An
//! unreadable directory or a file that vanishes mid-read degrades to "no
//! change this cycle" or "no sessions"; the monitor shares the sessions
//! directory with the hook and must tolerate read races.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use fs_err as fs;
use tracing::{debug, info, warn};

use crate::config::{file_stem, is_status_file_name, MonitorConfig};
use crate::session::liveness::{classify, Verdict};
use crate::session::record::parse_record;
use crate::session::{RecordCache, SessionSelector};
use crate::types::{SelectionMode, SessionRecord, SessionStatus};

/// Subscriber interface. All methods have default no-op bodies so consumers
/// implement only what they render.
pub trait MonitorObserver: Send + Sync {
    /// The set of valid sessions changed (membership, status, or metadata).
    fn on_session_list_changed(&self, _sessions: &[SessionRecord]) {}

    /// The `(is_active, status, session_id)` tuple changed.
    fn on_status_changed(
        &self,
        _is_active: bool,
        _status: Option<&SessionStatus>,
        _session_id: Option<&str>,
    ) {
    }

    /// The monitored session id changed to a different, non-nil id.
    fn on_session_switched(&self, _previous: Option<&str>, _current: &SessionRecord) {}
}

/// Observer that ignores everything. Useful for tests and headless callers.
pub struct NullObserver;

impl MonitorObserver for NullObserver {}

/// The externally visible outcome of a scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusSnapshot {
    pub is_active: bool,
    pub status: Option<SessionStatus>,
    pub session_id: Option<String>,
}

#[derive(Debug)]
struct ScanState {
    cache: RecordCache,
    selector: SessionSelector,
    sessions: Vec<SessionRecord>,
    snapshot: StatusSnapshot,
}

enum ObserverEvent {
    ListChanged(Vec<SessionRecord>),
    StatusChanged(StatusSnapshot),
    SessionSwitched {
        previous: Option<String>,
        current: SessionRecord,
    },
}

struct Inner {
    config: MonitorConfig,
    observer: Arc<dyn MonitorObserver>,
    /// Unix epoch seconds at construction; pre-existing active records older
    /// than this (minus grace) are suppressed.
    started_at: f64,
    scan: Mutex<ScanState>,
    mode: Mutex<SelectionMode>,
    focused_tty: Mutex<Option<String>>,
    /// Pre-resolved tab titles, keyed by TTY, pushed by the terminal-focus
    /// collaborator.
    tab_titles: Mutex<HashMap<String, String>>,
    polling: AtomicBool,
    poll_thread: Mutex<Option<JoinHandle<()>>>,
}

/// Watches the sessions directory and mirrors the most interesting session.
pub struct SessionMonitor {
    inner: Arc<Inner>,
}

impl SessionMonitor {
    pub fn new(config: MonitorConfig, observer: Arc<dyn MonitorObserver>) -> Self {
        let stickiness = config.stickiness_secs;
        Self {
            inner: Arc::new(Inner {
                config,
                observer,
                started_at: epoch_now(),
                scan: Mutex::new(ScanState {
                    cache: RecordCache::new(),
                    selector: SessionSelector::new(stickiness),
                    sessions: Vec::new(),
                    snapshot: StatusSnapshot::default(),
                }),
                mode: Mutex::new(SelectionMode::AnyActive),
                focused_tty: Mutex::new(None),
                tab_titles: Mutex::new(HashMap::new()),
                polling: AtomicBool::new(false),
                poll_thread: Mutex::new(None),
            }),
        }
    }

    /// Runs one scan cycle synchronously on the calling thread.
    pub fn scan_now(&self) {
        Inner::run_scan(&self.inner);
    }

    /// Starts the poll loop: an immediate scan, then one per interval.
    /// No-op if polling is already running.
    pub fn start_polling(&self) {
        if self.inner.polling.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let handle = thread::Builder::new()
            .name("critter-monitor".to_string())
            .spawn(move || {
                while inner.polling.load(Ordering::SeqCst) {
                    Inner::run_scan(&inner);
                    if !inner.polling.load(Ordering::SeqCst) {
                        break;
                    }
                    thread::park_timeout(inner.config.poll_interval);
                }
                debug!("Poll loop stopped");
            });

        match handle {
            Ok(handle) => {
                *lock(&self.inner.poll_thread) = Some(handle);
            }
            Err(err) => {
                warn!(error = %err, "Failed to spawn poll thread");
                self.inner.polling.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Stops the poll loop without blocking. A scan already in flight is
    /// allowed to finish.
    pub fn stop_polling(&self) {
        self.inner.polling.store(false, Ordering::SeqCst);
        if let Some(handle) = lock(&self.inner.poll_thread).take() {
            handle.thread().unpark();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner.polling.load(Ordering::SeqCst)
    }

    /// Stores the focused terminal's TTY. Consulted at the start of the next
    /// scan under `FollowFocusedTerminal`; never interrupts a scan.
    pub fn update_focused_tty(&self, tty: Option<String>) {
        *lock(&self.inner.focused_tty) = tty;
    }

    /// Stores a pre-resolved tab title for a TTY. Applied to matching
    /// records on the next scan.
    pub fn update_tab_title(&self, tty: &str, title: &str) {
        lock(&self.inner.tab_titles).insert(tty.to_string(), title.to_string());
    }

    pub fn selection_mode(&self) -> SelectionMode {
        lock(&self.inner.mode).clone()
    }

    /// Sets the selection policy. Takes effect on the next scan.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        *lock(&self.inner.mode) = mode;
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner.scan).snapshot.is_active
    }

    pub fn current_status(&self) -> Option<SessionStatus> {
        lock(&self.inner.scan).snapshot.status.clone()
    }

    pub fn current_session_id(&self) -> Option<String> {
        lock(&self.inner.scan).snapshot.session_id.clone()
    }

    /// The valid sessions observed by the last completed scan.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        lock(&self.inner.scan).sessions.clone()
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

impl Inner {
    /// One complete scan cycle. Runs the cycle a second time, once, when a
    /// pinned session disappears and the mode falls back to `AnyActive`.
    fn run_scan(inner: &Arc<Inner>) {
        let mut events: Vec<ObserverEvent> = Vec::new();

        {
            let mut state = lock(&inner.scan);
            let mut reran = false;

            loop {
                let now = epoch_now();
                // Inputs pushed from outside are sampled once, up front; a
                // focus change mid-scan waits for the next cycle.
                let mode = lock(&inner.mode).clone();
                let focused = lock(&inner.focused_tty).clone();
                let valid = inner.collect_valid_sessions(&mut state, now);

                let monitored =
                    state
                        .selector
                        .select(&valid, &mode, focused.as_deref(), now);
                let snapshot = StatusSnapshot {
                    is_active: monitored.is_some(),
                    status: monitored.as_ref().map(|r| r.status.clone()),
                    session_id: monitored.as_ref().map(|r| r.session_id.clone()),
                };

                if valid != state.sessions {
                    events.push(ObserverEvent::ListChanged(valid.clone()));

                    if let SelectionMode::Specific { session_id } = &mode {
                        let still_present =
                            valid.iter().any(|s| &s.session_id == session_id);
                        if !still_present && !reran {
                            info!(
                                session_id = %session_id,
                                "Pinned session disappeared, falling back to AnyActive"
                            );
                            *lock(&inner.mode) = SelectionMode::AnyActive;
                            state.sessions = valid;
                            reran = true;
                            continue;
                        }
                    }
                }
                state.sessions = valid;

                let previous_id = state.snapshot.session_id.clone();
                let changed = snapshot != state.snapshot;
                if changed {
                    events.push(ObserverEvent::StatusChanged(snapshot.clone()));
                }

                if let (Some(current), Some(current_id)) =
                    (monitored.as_ref(), snapshot.session_id.as_deref())
                {
                    if previous_id.as_deref() != Some(current_id) {
                        info!(
                            previous = ?previous_id,
                            current = %current_id,
                            "Monitored session switched"
                        );
                        events.push(ObserverEvent::SessionSwitched {
                            previous: previous_id,
                            current: current.clone(),
                        });
                    }
                }

                state.snapshot = snapshot;
                break;
            }
        }

        for event in events {
            match event {
                ObserverEvent::ListChanged(sessions) => {
                    inner.observer.on_session_list_changed(&sessions);
                }
                ObserverEvent::StatusChanged(snapshot) => {
                    inner.observer.on_status_changed(
                        snapshot.is_active,
                        snapshot.status.as_ref(),
                        snapshot.session_id.as_deref(),
                    );
                }
                ObserverEvent::SessionSwitched { previous, current } => {
                    inner
                        .observer
                        .on_session_switched(previous.as_deref(), &current);
                }
            }
        }
    }

    /// Steps 1-6 of the scan: list, parse-or-reuse, classify, clean up,
    /// and sort by recency.
    fn collect_valid_sessions(
        &self,
        state: &mut MutexGuard<'_, ScanState>,
        now: f64,
    ) -> Vec<SessionRecord> {
        let dir = &self.config.sessions_dir;

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                // Missing directory is the normal cold-start case; anything
                // else is swallowed the same way and reported as no sessions.
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %err, "Sessions directory unreadable");
                }
                state.cache.clear();
                return Vec::new();
            }
        };

        let mut present: HashSet<String> = HashSet::new();
        let mut valid: Vec<SessionRecord> = Vec::new();
        let mut to_delete: Vec<String> = Vec::new();

        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_status_file_name(&file_name) {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(err) => {
                    // Vanished between listing and stat; next tick sorts it out.
                    debug!(file = %file_name, error = %err, "Could not stat status file");
                    continue;
                }
            };
            present.insert(file_name.clone());

            let record = match state.cache.get(&file_name, modified) {
                Some(cached) => cached.clone(),
                None => {
                    let bytes = match fs::read(entry.path()) {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            debug!(file = %file_name, error = %err, "Could not read status file");
                            continue;
                        }
                    };
                    match parse_record(&bytes, file_stem(&file_name)) {
                        Ok(record) => {
                            state.cache.put(file_name.clone(), modified, record.clone());
                            record
                        }
                        Err(err) => {
                            // Possibly mid-write: skip, never delete.
                            debug!(file = %file_name, error = %err, "Unparseable status file, skipping");
                            continue;
                        }
                    }
                }
            };

            match classify(&record, &self.config, self.started_at, now) {
                Verdict::Valid => valid.push(record),
                Verdict::Stale => to_delete.push(file_name.clone()),
            }
        }

        for file_name in to_delete {
            let path = dir.join(&file_name);
            info!(file = %file_name, "Deleting stale session file");
            if let Err(err) = fs::remove_file(&path) {
                warn!(file = %file_name, error = %err, "Failed to delete stale session file");
            }
            state.cache.evict(&file_name);
            present.remove(&file_name);
        }

        state.cache.evict_orphans(&present);

        let titles = lock(&self.tab_titles);
        for record in &mut valid {
            if let Some(tty) = &record.tty {
                if let Some(title) = titles.get(tty) {
                    record.tab_title = Some(title.clone());
                }
            }
        }
        drop(titles);

        valid.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));

        debug!(
            valid = valid.len(),
            cached = state.cache.len(),
            "Scan cycle complete"
        );
        valid
    }
}

/// Unix epoch seconds with sub-second precision, matching hook timestamps.
fn epoch_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Mutex acquisition that survives a poisoned lock; a panicking observer
/// must not take the monitor down with it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
