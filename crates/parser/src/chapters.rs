//! Chapter segmentation over ordered todo snapshots.
//!
//! A chapter closes the first time a given todo text shows up as
//! completed. Chapters chain: each starts at the previous completion
//! index, so ranges `(start, end]` are non-overlapping and ordered.

use hindsight_core::{Chapter, TodoSnapshot, TodoStatus};
use std::collections::HashSet;

/// Derive chapters from snapshots, in completion order.
///
/// Within one snapshot, todos are scanned in their given order. Two new
/// completions inside the same snapshot both close at that snapshot's
/// message index, which leaves the second chapter zero-width. That is the
/// intended reading of completion order, kept as-is.
pub fn segment(snapshots: &[TodoSnapshot]) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut boundary = 0usize;

    for snapshot in snapshots {
        for todo in &snapshot.todos {
            if todo.status != TodoStatus::Completed {
                continue;
            }
            if !seen.insert(todo.content.as_str()) {
                continue;
            }
            chapters.push(Chapter {
                title: todo.content.clone(),
                start_index: boundary,
                end_index: snapshot.message_index,
                completed_at: snapshot.message_index,
                message_count: snapshot.message_index - boundary,
            });
            boundary = snapshot.message_index;
        }
    }

    chapters
}
