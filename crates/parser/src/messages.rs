//! Full message materialization for navigation.
//!
//! The cache stores summaries only; when a caller asks for actual message
//! bodies the backing file is re-read into a flat user+assistant list.

use crate::extract::entry_text;
use crate::transcript::{self, RawEntry};
use hindsight_core::{Role, TranscriptMessage};
use std::path::Path;

/// Re-read a transcript into its ordered user+assistant messages.
///
/// Positions line up with extraction-time message indices: the message at
/// position `i` here is message `i + 1` in chapter ranges.
pub fn collect_messages(path: &Path) -> std::io::Result<Vec<TranscriptMessage>> {
    let entries = transcript::read_entries(path)?;
    Ok(materialize(&entries))
}

fn materialize(entries: &[RawEntry]) -> Vec<TranscriptMessage> {
    let mut messages: Vec<TranscriptMessage> = Vec::new();
    let mut user_turns = 0usize;

    for entry in entries {
        match entry {
            RawEntry::User(conv) => {
                user_turns += 1;
                messages.push(TranscriptMessage {
                    index: messages.len(),
                    role: Role::User,
                    text: entry_text(conv, " "),
                    timestamp: conv.timestamp.clone(),
                    user_turn: user_turns,
                });
            }
            RawEntry::Assistant(conv) => {
                messages.push(TranscriptMessage {
                    index: messages.len(),
                    role: Role::Assistant,
                    // Assistant turns can carry several text blocks;
                    // keep them on separate lines
                    text: entry_text(conv, "\n"),
                    timestamp: conv.timestamp.clone(),
                    user_turn: user_turns,
                });
            }
            RawEntry::Summary { .. } | RawEntry::Unknown => {}
        }
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn materialize_from(lines: Vec<serde_json::Value>) -> Vec<TranscriptMessage> {
        let entries: Vec<RawEntry> = lines
            .into_iter()
            .map(|line| serde_json::from_value(line).unwrap())
            .collect();
        materialize(&entries)
    }

    #[test]
    fn assistant_messages_inherit_the_preceding_user_turn() {
        let messages = materialize_from(vec![
            json!({"type": "assistant", "message": {"content": [{"type": "text", "text": "hello"}]}}),
            json!({"type": "user", "message": {"content": "do a thing"}}),
            json!({"type": "assistant", "message": {"content": [{"type": "text", "text": "working"}]}}),
            json!({"type": "assistant", "message": {"content": [{"type": "text", "text": "done"}]}}),
            json!({"type": "user", "message": {"content": "next"}}),
        ]);
        let turns: Vec<usize> = messages.iter().map(|m| m.user_turn).collect();
        assert_eq!(turns, vec![0, 1, 1, 1, 2]);
        let indices: Vec<usize> = messages.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn non_message_entries_do_not_shift_positions() {
        let messages = materialize_from(vec![
            json!({"type": "summary", "summary": "earlier work"}),
            json!({"type": "user", "message": {"content": "hi"}}),
            json!({"type": "system", "level": "info"}),
            json!({"type": "assistant", "message": {"content": [{"type": "text", "text": "hey"}]}}),
        ]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].index, 0);
        assert_eq!(messages[1].index, 1);
    }

    #[test]
    fn text_join_depends_on_role() {
        let messages = materialize_from(vec![
            json!({"type": "user", "message": {"content": [
                {"type": "text", "text": "part one"},
                {"type": "text", "text": "part two"}
            ]}}),
            json!({"type": "assistant", "message": {"content": [
                {"type": "text", "text": "first block"},
                {"type": "thinking", "thinking": "private"},
                {"type": "text", "text": "second block"}
            ]}}),
        ]);
        assert_eq!(messages[0].text, "part one part two");
        assert_eq!(messages[1].text, "first block\nsecond block");
    }

    #[test]
    fn tool_result_only_messages_keep_their_slot_with_empty_text() {
        let messages = materialize_from(vec![
            json!({"type": "user", "message": {"content": "run tests"}}),
            json!({"type": "assistant", "message": {"content": [
                {"type": "tool_use", "name": "Bash", "input": {"command": "cargo test"}}
            ]}}),
            json!({"type": "user", "message": {"content": [
                {"type": "tool_result", "tool_use_id": "t1", "content": "all passed"}
            ]}}),
        ]);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "");
        assert_eq!(messages[2].text, "");
        assert_eq!(messages[2].user_turn, 2);
    }

    #[test]
    fn collect_messages_propagates_missing_file() {
        let err = collect_messages(Path::new("/nonexistent/y.jsonl")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
