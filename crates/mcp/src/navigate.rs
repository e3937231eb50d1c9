//! Windowed access to full message bodies.
//!
//! The cache holds summaries only, so navigation re-reads the transcript
//! and materializes just the requested slice. Two addressing modes:
//! absolute 0-based positions, and user-turn ordinals for "what happened
//! around the Nth thing I asked".

use std::io;
use std::path::Path;

use hindsight_core::{RecallError, Role, TranscriptMessage};
use hindsight_parser::collect_messages;
use serde::Serialize;

/// A slice of the conversation addressed by absolute position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextWindow {
    pub messages: Vec<TranscriptMessage>,
    pub total_messages: usize,
    /// Start position actually served, after expansion and clamping
    pub actual_start: usize,
    /// End position actually served (exclusive)
    pub actual_end: usize,
    pub can_expand_before: bool,
    pub can_expand_after: bool,
}

/// A slice of the conversation centered on one user turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnWindow {
    pub messages: Vec<TranscriptMessage>,
    pub total_messages: usize,
    pub total_user_turns: usize,
    /// Inclusive range of user-turn ordinals served
    pub turn_range: (usize, usize),
}

/// Serve `[start, end)` grown by `expand` on both sides and clamped to the
/// transcript. Expansion state is computed before any role filtering, so
/// the flags describe the conversation, not the filtered view.
pub fn absolute_range(
    path: &Path,
    session_id: &str,
    start: usize,
    end: usize,
    expand: usize,
    role: Option<Role>,
) -> Result<ContextWindow, RecallError> {
    let all = read_messages(path, session_id)?;
    let total = all.len();

    let actual_start = start.saturating_sub(expand);
    let actual_end = end.saturating_add(expand).min(total);

    let mut messages: Vec<TranscriptMessage> = all
        .into_iter()
        .filter(|m| m.index >= actual_start && m.index < actual_end)
        .collect();
    retain_role(&mut messages, role);

    Ok(ContextWindow {
        messages,
        total_messages: total,
        actual_start,
        actual_end,
        can_expand_before: actual_start > 0,
        can_expand_after: actual_end < total,
    })
}

/// Serve the messages whose user-turn ordinal falls within `radius` of
/// `turn`, endpoints clamped to the turns that exist. Messages before the
/// first user turn are never part of a turn window.
pub fn turn_centered(
    path: &Path,
    session_id: &str,
    turn: usize,
    radius: usize,
    role: Option<Role>,
) -> Result<TurnWindow, RecallError> {
    let all = read_messages(path, session_id)?;
    let total = all.len();
    let total_user_turns = all.iter().filter(|m| m.role == Role::User).count();

    if total_user_turns == 0 {
        return Ok(TurnWindow {
            messages: Vec::new(),
            total_messages: total,
            total_user_turns: 0,
            turn_range: (0, 0),
        });
    }

    let turn_start = turn.saturating_sub(radius).clamp(1, total_user_turns);
    let turn_end = turn.saturating_add(radius).clamp(1, total_user_turns);

    let mut messages: Vec<TranscriptMessage> = all
        .into_iter()
        .filter(|m| m.user_turn >= turn_start && m.user_turn <= turn_end)
        .collect();
    retain_role(&mut messages, role);

    Ok(TurnWindow {
        messages,
        total_messages: total,
        total_user_turns,
        turn_range: (turn_start, turn_end),
    })
}

fn read_messages(path: &Path, session_id: &str) -> Result<Vec<TranscriptMessage>, RecallError> {
    collect_messages(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            RecallError::not_found(session_id)
        } else {
            RecallError::Io(err)
        }
    })
}

fn retain_role(messages: &mut Vec<TranscriptMessage>, role: Option<Role>) {
    if let Some(role) = role {
        messages.retain(|m| m.role == role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn user_line(text: &str) -> String {
        format!(r#"{{"type":"user","sessionId":"s1","message":{{"content":"{text}"}}}}"#)
    }

    fn assistant_line(text: &str) -> String {
        format!(r#"{{"type":"assistant","sessionId":"s1","message":{{"content":"{text}"}}}}"#)
    }

    fn write_transcript(dir: &TempDir, lines: &[String]) -> PathBuf {
        let path = dir.path().join("s1.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn alternating(pairs: usize) -> Vec<String> {
        (0..pairs)
            .flat_map(|i| [user_line(&format!("u{i}")), assistant_line(&format!("a{i}"))])
            .collect()
    }

    #[test]
    fn expansion_grows_and_clamps_the_window() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &alternating(10));

        let window = absolute_range(&path, "s1", 5, 5, 3, None).unwrap();
        assert_eq!(window.total_messages, 20);
        assert_eq!((window.actual_start, window.actual_end), (2, 8));
        assert_eq!(window.messages.len(), 6);
        assert_eq!(window.messages[0].index, 2);
        assert!(window.can_expand_before);
        assert!(window.can_expand_after);
    }

    #[test]
    fn window_at_the_edges_cannot_expand() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &alternating(2));

        let window = absolute_range(&path, "s1", 0, 3, 5, None).unwrap();
        assert_eq!((window.actual_start, window.actual_end), (0, 4));
        assert_eq!(window.messages.len(), 4);
        assert!(!window.can_expand_before);
        assert!(!window.can_expand_after);
    }

    #[test]
    fn role_filter_never_changes_window_geometry() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &alternating(5));

        let window = absolute_range(&path, "s1", 2, 8, 0, Some(Role::User)).unwrap();
        assert_eq!((window.actual_start, window.actual_end), (2, 8));
        assert_eq!(window.total_messages, 10);
        assert!(window.messages.iter().all(|m| m.role == Role::User));
        assert_eq!(window.messages.len(), 3);
    }

    #[test]
    fn turn_window_is_inclusive_and_clamped() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &alternating(3));

        let window = turn_centered(&path, "s1", 2, 1, None).unwrap();
        assert_eq!(window.total_user_turns, 3);
        assert_eq!(window.turn_range, (1, 3));
        assert_eq!(window.messages.len(), 6);

        let window = turn_centered(&path, "s1", 9, 1, None).unwrap();
        assert_eq!(window.turn_range, (3, 3));
        assert_eq!(window.messages.len(), 2);
        assert_eq!(window.messages[0].text, "u2");
    }

    #[test]
    fn preamble_before_first_user_turn_stays_out_of_turn_windows() {
        let dir = TempDir::new().unwrap();
        let lines = vec![
            assistant_line("session resumed"),
            user_line("first ask"),
            assistant_line("done"),
        ];
        let path = write_transcript(&dir, &lines);

        let window = turn_centered(&path, "s1", 1, 0, None).unwrap();
        assert_eq!(window.total_messages, 3);
        assert_eq!(window.messages.len(), 2);
        assert_eq!(window.messages[0].text, "first ask");
    }

    #[test]
    fn transcript_without_user_turns_yields_empty_window() {
        let dir = TempDir::new().unwrap();
        let path = write_transcript(&dir, &[assistant_line("only me here")]);

        let window = turn_centered(&path, "s1", 1, 2, None).unwrap();
        assert!(window.messages.is_empty());
        assert_eq!(window.total_messages, 1);
        assert_eq!(window.total_user_turns, 0);
        assert_eq!(window.turn_range, (0, 0));
    }

    #[test]
    fn missing_transcript_is_session_not_found() {
        let err = absolute_range(Path::new("/nonexistent/s1.jsonl"), "s1", 0, 5, 0, None)
            .unwrap_err();
        assert!(matches!(err, RecallError::SessionNotFound { .. }));
    }
}
