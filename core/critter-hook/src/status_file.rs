//! Atomic status-file writes and cleanup.
//!
//! The monitor may read a status file at any moment, so every write goes
//! through a temp file in the same directory followed by a rename. A reader
//! either sees the old payload or the new one, never a torn write.

use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use fs_err as fs;
use tempfile::NamedTempFile;

use critter_core::{MonitorConfig, SessionStatus, StatusPayload, STATUS_FILE_SUFFIX};

pub fn write_status(
    session_id: &str,
    status: SessionStatus,
    timestamp: f64,
    cwd: Option<&str>,
    tty: Option<&str>,
    tool_name: Option<&str>,
) -> Result<(), String> {
    let config = default_config()?;
    write_status_in(
        &config.sessions_dir,
        session_id,
        status,
        timestamp,
        cwd,
        tty,
        tool_name,
    )
}

pub fn write_status_in(
    dir: &Path,
    session_id: &str,
    status: SessionStatus,
    timestamp: f64,
    cwd: Option<&str>,
    tty: Option<&str>,
    tool_name: Option<&str>,
) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create sessions dir: {}", e))?;

    let payload = StatusPayload {
        status,
        timestamp,
        session_id: Some(session_id.to_string()),
        tool_name: tool_name.map(|s| s.to_string()),
        cwd: cwd.map(|s| s.to_string()),
        tty: tty.map(|s| s.to_string()),
    };

    let content = serde_json::to_string(&payload)
        .map_err(|e| format!("Failed to serialize status: {}", e))?;

    let mut temp_file =
        NamedTempFile::new_in(dir).map_err(|e| format!("Temp file error: {}", e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| format!("Failed to write temp status file: {}", e))?;
    temp_file
        .flush()
        .map_err(|e| format!("Failed to flush temp status file: {}", e))?;
    temp_file
        .persist(status_path(dir, session_id))
        .map_err(|e| format!("Failed to persist status file: {}", e.error))?;

    Ok(())
}

/// Best-effort removal; a file already gone is not a failure.
pub fn remove_status(session_id: &str) {
    if let Ok(config) = default_config() {
        remove_status_in(&config.sessions_dir, session_id);
    }
}

pub fn remove_status_in(dir: &Path, session_id: &str) {
    let path = status_path(dir, session_id);
    if let Err(e) = fs::remove_file(&path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %e, session = %session_id, "Failed to remove status file");
        }
    }
}

/// Removes status files older than the monitor's no-witness timeout.
/// Covers installations where the pet never runs and nothing else cleans up.
pub fn prune() -> Result<(), String> {
    let config = default_config()?;
    prune_in(
        &config.sessions_dir,
        Duration::from_secs(config.no_tty_timeout_secs as u64),
    )
}

pub fn prune_in(dir: &Path, max_age: Duration) -> Result<(), String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(format!("Failed to list sessions dir: {}", e)),
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(STATUS_FILE_SUFFIX) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok());

        if let Some(age) = age {
            if age > max_age {
                tracing::info!(file = %file_name, "Pruning abandoned status file");
                if let Err(e) = fs::remove_file(entry.path()) {
                    tracing::warn!(file = %file_name, error = %e, "Failed to prune status file");
                }
            }
        }
    }

    Ok(())
}

fn default_config() -> Result<MonitorConfig, String> {
    MonitorConfig::new().map_err(|e| e.to_string())
}

fn status_path(dir: &Path, session_id: &str) -> std::path::PathBuf {
    dir.join(format!("{session_id}{STATUS_FILE_SUFFIX}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_core::parse_record;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_parse_round_trip() {
        let dir = TempDir::new().unwrap();
        write_status_in(
            dir.path(),
            "s1",
            SessionStatus::Tools,
            1_700_000_000.5,
            Some("/repo"),
            Some("/dev/ttys003"),
            Some("Bash"),
        )
        .unwrap();

        let bytes = fs::read(dir.path().join("s1.status.json")).unwrap();
        let record = parse_record(&bytes, "s1").unwrap();
        assert_eq!(record.session_id, "s1");
        assert_eq!(record.status, SessionStatus::Tools);
        assert_eq!(record.timestamp, 1_700_000_000.5);
        assert_eq!(record.working_directory.as_deref(), Some("/repo"));
        assert_eq!(record.tty.as_deref(), Some("/dev/ttys003"));
        assert_eq!(record.tool_name.as_deref(), Some("Bash"));
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("not").join("yet");
        write_status_in(&nested, "s1", SessionStatus::Idle, 1.0, None, None, None).unwrap();
        assert!(nested.join("s1.status.json").exists());
    }

    #[test]
    fn test_rewrite_replaces_previous_payload() {
        let dir = TempDir::new().unwrap();
        write_status_in(dir.path(), "s1", SessionStatus::Thinking, 1.0, None, None, None).unwrap();
        write_status_in(dir.path(), "s1", SessionStatus::Idle, 2.0, None, None, None).unwrap();

        let bytes = fs::read(dir.path().join("s1.status.json")).unwrap();
        let record = parse_record(&bytes, "s1").unwrap();
        assert_eq!(record.status, SessionStatus::Idle);
        assert_eq!(record.timestamp, 2.0);
    }

    #[test]
    fn test_remove_is_quiet_when_file_missing() {
        let dir = TempDir::new().unwrap();
        remove_status_in(dir.path(), "never-existed");
    }

    #[test]
    fn test_prune_removes_only_old_status_files() {
        let dir = TempDir::new().unwrap();
        write_status_in(dir.path(), "fresh", SessionStatus::Idle, 1.0, None, None, None).unwrap();
        fs::write(dir.path().join("keep.txt"), b"not a status file").unwrap();

        // Freshly written files survive a generous max age.
        prune_in(dir.path(), Duration::from_secs(3600)).unwrap();
        assert!(dir.path().join("fresh.status.json").exists());

        // With a zero max age everything with the status suffix goes.
        prune_in(dir.path(), Duration::from_secs(0)).unwrap();
        assert!(!dir.path().join("fresh.status.json").exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_prune_tolerates_missing_directory() {
        let dir = TempDir::new().unwrap();
        prune_in(&dir.path().join("absent"), Duration::from_secs(1)).unwrap();
    }
}
