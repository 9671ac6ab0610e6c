//! File-backed logging for the hook binary.
//!
//! Hooks run inside the assistant's process tree and stdout/stderr feed back
//! into it, so log output goes to `~/.critter/logs/` instead. The returned
//! guard must live for the duration of `main` so buffered lines flush.

use fs_err as fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn init() -> Option<WorkerGuard> {
    let log_dir = dirs::home_dir()?.join(".critter").join("logs");
    fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::daily(log_dir, "critter-hook.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("CRITTER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
