//! Parsed-record cache keyed by file identity and modification time.
//!
//! Once a session goes idle its file stops changing, so steady-state polling
//! should cost a directory listing, not a JSON parse per file per tick. An
//! entry is a hit only when the stored mtime matches the current one
//! exactly; any drift (or a missing entry) is a miss. Entries never outlive
//! their backing file: the orchestrator evicts deleted files in the same
//! scan cycle that observes their absence.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use crate::types::SessionRecord;

#[derive(Debug, Clone)]
struct CacheEntry {
    modified: SystemTime,
    record: SessionRecord,
}

/// Memoizes parsed `SessionRecord`s per status-file name.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: HashMap<String, CacheEntry>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached record only if `modified` equals the mtime it was
    /// stored with.
    pub fn get(&self, file_name: &str, modified: SystemTime) -> Option<&SessionRecord> {
        self.entries
            .get(file_name)
            .filter(|entry| entry.modified == modified)
            .map(|entry| &entry.record)
    }

    pub fn put(&mut self, file_name: String, modified: SystemTime, record: SessionRecord) {
        self.entries.insert(file_name, CacheEntry { modified, record });
    }

    pub fn evict(&mut self, file_name: &str) {
        self.entries.remove(file_name);
    }

    /// Drops every entry whose file is not in the current directory listing.
    /// Run once per scan after the listing is known.
    pub fn evict_orphans(&mut self, current_files: &HashSet<String>) {
        self.entries.retain(|name, _| current_files.contains(name));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
