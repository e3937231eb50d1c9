//! Filesystem discovery of project transcripts.
//!
//! Claude Code writes one JSONL transcript per session under
//! `<projects-root>/<encoded-project-dir>/<session-id>.jsonl`. Discovery is
//! a flat two-level walk: project directories, then the transcripts inside
//! them.

use std::path::{Path, PathBuf};

/// Names of the project directories directly under `root`, sorted.
pub fn list_projects(root: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(root = %root.display(), error = %err, "cannot read projects root");
            return Vec::new();
        }
    };
    let mut projects: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .collect();
    projects.sort();
    projects
}

/// All `*.jsonl` transcripts one level below the project directories,
/// sorted by path.
pub fn session_files(root: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/*/*.jsonl", root.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .map(|paths| paths.filter_map(Result::ok).collect())
        .unwrap_or_default();
    files.sort();
    files
}
