use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Tracked state of a single todo item inside a planning-tool snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Completed,
    InProgress,
    #[default]
    Pending,
}

/// One todo as emitted by a planning tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub content: String,
    #[serde(default)]
    pub status: TodoStatus,
}

/// Point-in-time todo list captured from one planning tool invocation.
///
/// Snapshots are ordered by ascending `message_index`; one snapshot per
/// qualifying tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoSnapshot {
    /// Message index of the assistant entry that carried the tool call
    pub message_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub todos: Vec<TodoItem>,
}

/// The last snapshot's todos partitioned by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalTodos {
    pub completed: Vec<String>,
    pub in_progress: Vec<String>,
    pub pending: Vec<String>,
}

impl FinalTodos {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.in_progress.is_empty() && self.pending.is_empty()
    }
}

/// A derived phase of work, bounded by a todo-completion event.
///
/// The range is half-open on the left: `(start_index, end_index]` in
/// 1-based message indices. Chapters chain: each chapter starts where the
/// previous one completed, so they are non-overlapping and ordered by
/// ascending `completed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Completed todo text that closed this chapter
    pub title: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Message index of the snapshot that completed this chapter
    pub completed_at: usize,
    pub message_count: usize,
}

/// Normalized summary of one session transcript.
///
/// Built by a full re-parse of the backing file and replaced wholesale
/// whenever the file's mtime advances. Holds summaries only; full message
/// bodies are re-read on demand by navigation.
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub session_id: String,
    /// Encoded project directory name the transcript lives under
    pub project: String,
    pub file_path: PathBuf,
    /// On-disk modification time at the moment of extraction
    pub mtime: SystemTime,
    /// Raw timestamp string of the last timestamped entry
    pub timestamp: Option<String>,
    pub message_count: usize,
    pub user_message_count: usize,
    /// Abridged user-message trail: first two and last two non-empty
    /// user messages, each truncated to 200 characters
    pub user_message_arc: Vec<String>,
    pub todo_snapshots: Vec<TodoSnapshot>,
    pub final_todos: FinalTodos,
    pub chapters: Vec<Chapter>,
    /// Latest summary-type entry in the transcript, if any
    pub title: Option<String>,
}

impl ConversationRecord {
    /// Standard one-line summary: the first three completed todos, or the
    /// user-message arc when the session produced no todos at all.
    pub fn summary(&self) -> String {
        if !self.final_todos.is_empty() {
            self.final_todos
                .completed
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join("; ")
        } else {
            self.user_message_arc.join(" … ")
        }
    }

    /// File modification time as RFC 3339, for external responses.
    pub fn last_modified(&self) -> String {
        DateTime::<Utc>::from(self.mtime).to_rfc3339()
    }
}

/// One ranked hit from a summary search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub session_id: String,
    pub score: u32,
    /// Todo texts that matched at least one term, verbatim
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub matched_todos: Vec<String>,
    /// Arc entries that matched at least one term, verbatim
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub matched_user_messages: Vec<String>,
    pub summary: String,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(final_todos: FinalTodos, arc: Vec<String>) -> ConversationRecord {
        ConversationRecord {
            session_id: "s1".to_string(),
            project: "proj".to_string(),
            file_path: PathBuf::from("/tmp/s1.jsonl"),
            mtime: SystemTime::UNIX_EPOCH,
            timestamp: None,
            message_count: 0,
            user_message_count: 0,
            user_message_arc: arc,
            todo_snapshots: Vec::new(),
            final_todos,
            chapters: Vec::new(),
            title: None,
        }
    }

    #[test]
    fn summary_prefers_completed_todos() {
        let record = record_with(
            FinalTodos {
                completed: vec![
                    "set up schema".to_string(),
                    "wire up routes".to_string(),
                    "add tests".to_string(),
                    "deploy".to_string(),
                ],
                in_progress: vec![],
                pending: vec![],
            },
            vec!["please build a web app".to_string()],
        );
        assert_eq!(record.summary(), "set up schema; wire up routes; add tests");
    }

    #[test]
    fn summary_falls_back_to_arc_only_without_todos() {
        let record = record_with(
            FinalTodos::default(),
            vec!["first ask".to_string(), "second ask".to_string()],
        );
        assert_eq!(record.summary(), "first ask … second ask");

        // Todos present but none completed: summary is the (empty) join,
        // not the arc.
        let record = record_with(
            FinalTodos {
                completed: vec![],
                in_progress: vec!["still going".to_string()],
                pending: vec![],
            },
            vec!["first ask".to_string()],
        );
        assert_eq!(record.summary(), "");
    }

    #[test]
    fn todo_status_decodes_with_pending_default() {
        let item: TodoItem = serde_json::from_value(serde_json::json!({
            "content": "write docs"
        }))
        .unwrap();
        assert_eq!(item.status, TodoStatus::Pending);

        let item: TodoItem = serde_json::from_value(serde_json::json!({
            "content": "write docs",
            "status": "in_progress"
        }))
        .unwrap();
        assert_eq!(item.status, TodoStatus::InProgress);
    }

    #[test]
    fn chapter_serializes_camel_case() {
        let chapter = Chapter {
            title: "land parser".to_string(),
            start_index: 4,
            end_index: 10,
            completed_at: 10,
            message_count: 6,
        };
        let value = serde_json::to_value(&chapter).unwrap();
        assert_eq!(value["startIndex"], 4);
        assert_eq!(value["completedAt"], 10);
    }
}
