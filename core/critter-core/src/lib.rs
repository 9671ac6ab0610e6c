//! # critter-core
//!
//! Session monitoring and selection for Critter, the desktop pet that
//! mirrors live coding-assistant sessions. The companion hook binary writes
//! one status file per session; this crate discovers those files, decides
//! which sessions are live, picks the single session worth showing, and
//! emits a debounced status signal the rendering layers subscribe to.
//!
//! ## Design Principles
//!
//! - **Synchronous core**: no async runtime. Polling runs on one plain
//!   background thread; everything else is callable from any thread.
//! - **Explicit ownership**: `SessionMonitor` is constructed and owned by
//!   the caller, with a typed observer passed in. No global instance, no
//!   process-wide pub/sub.
//! - **Graceful degradation**: filesystem races and malformed files degrade
//!   to "no change this cycle", never to an error a subscriber sees.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use critter_core::{MonitorConfig, NullObserver, SessionMonitor};
//! use std::sync::Arc;
//!
//! let monitor = SessionMonitor::new(MonitorConfig::new()?, Arc::new(NullObserver));
//! monitor.start_polling();
//! ```

pub mod config;
pub mod error;
pub mod monitor;
pub mod session;
pub mod transition;
pub mod types;

pub use config::{default_sessions_dir, MonitorConfig, STATUS_FILE_SUFFIX};
pub use error::{MonitorError, Result};
pub use monitor::{MonitorObserver, NullObserver, SessionMonitor, StatusSnapshot};
pub use session::{parse_record, RecordCache, SessionSelector, StatusPayload, Verdict};
pub use transition::{TransitionHandler, TransitionSignal};
pub use types::{SelectionMode, SessionRecord, SessionStatus};
