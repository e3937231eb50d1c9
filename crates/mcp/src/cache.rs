//! In-memory cache of extracted conversations, keyed by session id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hindsight_core::{ConversationRecord, RecallError};
use hindsight_parser::extract_conversation;

use crate::scan;

/// Refresh and parse counters, exposed for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of refresh passes run so far
    pub refreshes: u64,
    /// Number of transcript files parsed across all passes
    pub parses: u64,
}

/// Cache of extracted conversations, refreshed lazily from disk.
///
/// A record is fresh while its stored mtime is at least the backing file's
/// current mtime; fresh records are never re-parsed. A stale file is
/// re-extracted and its record replaced wholesale. Records whose backing
/// file disappears are kept, so finished sessions stay addressable for the
/// lifetime of the server.
#[derive(Debug)]
pub struct ConversationCache {
    root: PathBuf,
    records: HashMap<String, ConversationRecord>,
    by_path: HashMap<PathBuf, String>,
    stats: CacheStats,
}

impl ConversationCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            records: HashMap::new(),
            by_path: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Bring the cache up to date with the transcripts on disk.
    pub fn refresh(&mut self) {
        self.stats.refreshes += 1;
        for path in scan::session_files(&self.root) {
            let disk_mtime = match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
                Ok(mtime) => mtime,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "cannot stat transcript");
                    continue;
                }
            };
            if self.is_fresh(&path, disk_mtime) {
                continue;
            }
            self.stats.parses += 1;
            match extract_conversation(&path) {
                Ok(record) => {
                    tracing::debug!(
                        session_id = %record.session_id,
                        path = %path.display(),
                        "extracted conversation"
                    );
                    self.by_path.insert(path, record.session_id.clone());
                    self.records.insert(record.session_id.clone(), record);
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "cannot extract conversation");
                }
            }
        }
    }

    fn is_fresh(&self, path: &Path, disk_mtime: SystemTime) -> bool {
        self.by_path
            .get(path)
            .and_then(|id| self.records.get(id))
            .is_some_and(|record| record.mtime >= disk_mtime)
    }

    /// Look up a session by id.
    pub fn get(&self, session_id: &str) -> Result<&ConversationRecord, RecallError> {
        self.records
            .get(session_id)
            .ok_or_else(|| RecallError::not_found(session_id))
    }

    /// All cached records, in arbitrary order.
    pub fn records(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
