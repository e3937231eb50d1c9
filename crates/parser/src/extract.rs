//! Conversation extraction: one transcript file in, one normalized
//! [`ConversationRecord`] out.

use crate::chapters;
use crate::transcript::{
    self, RawContent, RawContentBlock, RawEntry, RawTodoInput, RawTranscriptEntry,
};
use hindsight_core::{ConversationRecord, FinalTodos, TodoItem, TodoSnapshot, TodoStatus};
use std::path::Path;
use std::time::SystemTime;

/// Tool names containing this marker are treated as todo-list writes.
/// Substring match on purpose: MCP-wrapped variants keep the marker inside
/// a longer name.
const TODO_TOOL_MARKER: &str = "TodoWrite";

/// User messages kept in the arc are truncated to this many characters.
const USER_EXCERPT_CHARS: usize = 200;

/// Fully re-parse one transcript into a record.
///
/// Stat failures (file vanished since it was scanned) propagate; an
/// unreadable file body is logged and treated as an empty transcript, so
/// callers aggregating over many files still get a record for it.
pub fn extract_conversation(path: &Path) -> std::io::Result<ConversationRecord> {
    let metadata = std::fs::metadata(path)?;
    let mtime = metadata.modified()?;

    let entries = match transcript::read_entries(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Unreadable transcript {}: {}", path.display(), e);
            Vec::new()
        }
    };

    Ok(build_record(path, mtime, &entries))
}

fn build_record(path: &Path, mtime: SystemTime, entries: &[RawEntry]) -> ConversationRecord {
    let mut session_id: Option<String> = None;
    let mut title: Option<String> = None;
    let mut timestamp: Option<String> = None;
    let mut message_index = 0usize;
    let mut user_message_count = 0usize;
    let mut user_texts: Vec<String> = Vec::new();
    let mut snapshots: Vec<TodoSnapshot> = Vec::new();

    for entry in entries {
        match entry {
            RawEntry::Summary {
                summary,
                session_id: sid,
            } => {
                set_first(&mut session_id, non_empty(sid.clone()));
                // Last summary line wins; compactions append newer ones.
                if let Some(text) = non_empty(summary.clone()) {
                    title = Some(text);
                }
            }
            RawEntry::User(conv) => {
                // Index every user/assistant entry before looking at its
                // content, so indices match raw transcript positions.
                message_index += 1;
                user_message_count += 1;
                set_first(&mut session_id, non_empty(conv.session_id.clone()));
                if let Some(ts) = non_empty(conv.timestamp.clone()) {
                    timestamp = Some(ts);
                }
                let text = entry_text(conv, " ");
                let text = text.trim();
                if !text.is_empty() {
                    user_texts.push(truncate_chars(text, USER_EXCERPT_CHARS));
                }
            }
            RawEntry::Assistant(conv) => {
                message_index += 1;
                set_first(&mut session_id, non_empty(conv.session_id.clone()));
                if let Some(ts) = non_empty(conv.timestamp.clone()) {
                    timestamp = Some(ts);
                }
                capture_todo_snapshots(conv, message_index, &mut snapshots);
            }
            RawEntry::Unknown => {}
        }
    }

    // Derive session_id from the file name if no entry carried one
    let session_id = session_id.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    });

    let project = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let final_todos = partition_final(&snapshots);
    let chapters = chapters::segment(&snapshots);

    ConversationRecord {
        session_id,
        project,
        file_path: path.to_path_buf(),
        mtime,
        timestamp,
        message_count: message_index,
        user_message_count,
        user_message_arc: build_arc(&user_texts),
        todo_snapshots: snapshots,
        final_todos,
        chapters,
        title,
    }
}

/// Capture one snapshot per qualifying tool call in this assistant entry.
fn capture_todo_snapshots(
    conv: &RawTranscriptEntry,
    message_index: usize,
    snapshots: &mut Vec<TodoSnapshot>,
) {
    let Some(message) = &conv.message else {
        return;
    };
    let RawContent::Blocks(blocks) = &message.content else {
        return;
    };

    for block in blocks {
        let RawContentBlock::ToolUse { name, input } = block else {
            continue;
        };
        if !name.contains(TODO_TOOL_MARKER) {
            continue;
        }
        // Malformed input degrades to an empty todo list, still a snapshot
        let todo_input: RawTodoInput = serde_json::from_value(input.clone()).unwrap_or_default();
        snapshots.push(TodoSnapshot {
            message_index,
            timestamp: conv.timestamp.clone(),
            todos: todo_input
                .todos
                .into_iter()
                .map(|todo| TodoItem {
                    content: todo.content,
                    status: todo_status(todo.status.as_deref()),
                })
                .collect(),
        });
    }
}

fn todo_status(raw: Option<&str>) -> TodoStatus {
    match raw {
        Some("completed") => TodoStatus::Completed,
        Some("in_progress") => TodoStatus::InProgress,
        // Absent and unrecognized statuses both fall back to pending
        _ => TodoStatus::Pending,
    }
}

/// Partition the last snapshot's todos by status, skipping empty content.
fn partition_final(snapshots: &[TodoSnapshot]) -> FinalTodos {
    let mut final_todos = FinalTodos::default();
    let Some(last) = snapshots.last() else {
        return final_todos;
    };
    for todo in &last.todos {
        if todo.content.is_empty() {
            continue;
        }
        let bucket = match todo.status {
            TodoStatus::Completed => &mut final_todos.completed,
            TodoStatus::InProgress => &mut final_todos.in_progress,
            TodoStatus::Pending => &mut final_todos.pending,
        };
        bucket.push(todo.content.clone());
    }
    final_todos
}

/// Keep messages 1, 2 and the last two; everything when four or fewer.
fn build_arc(texts: &[String]) -> Vec<String> {
    let n = texts.len();
    if n == 0 {
        return Vec::new();
    }
    let mut keep = vec![0, 1, n.saturating_sub(2), n - 1];
    keep.retain(|&i| i < n);
    keep.sort_unstable();
    keep.dedup();
    keep.into_iter().map(|i| texts[i].clone()).collect()
}

/// Text of an entry's message: plain string content as-is, block content
/// as its text blocks joined with `separator`.
pub(crate) fn entry_text(conv: &RawTranscriptEntry, separator: &str) -> String {
    match &conv.message {
        Some(message) => content_text(&message.content, separator),
        None => String::new(),
    }
}

fn content_text(content: &RawContent, separator: &str) -> String {
    match content {
        RawContent::Text(text) => text.clone(),
        RawContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                RawContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(separator),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        text.chars().take(max).collect()
    } else {
        text.to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn set_first<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        if let Some(v) = value {
            *slot = Some(v);
        }
    }
}
