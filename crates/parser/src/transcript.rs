//! Raw deserialization of Claude Code transcript files.
//!
//! A transcript is append-only JSONL: one entry per line, discriminated by
//! a `type` tag. Decoding is tolerant by contract: unknown entry types and
//! unknown content-block types degrade to catch-all variants, and a line
//! that fails to decode is skipped without aborting the scan.

use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;

// ── Raw JSONL deserialization types ──────────────────────────────────────────

/// Top-level entry in a Claude Code JSONL file. Each line is one of these.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum RawEntry {
    #[serde(rename = "user")]
    User(RawTranscriptEntry),
    #[serde(rename = "assistant")]
    Assistant(RawTranscriptEntry),
    #[serde(rename = "summary")]
    Summary {
        #[serde(default)]
        summary: Option<String>,
        #[serde(default, rename = "sessionId")]
        session_id: Option<String>,
    },
    // Catch-all for entry types we do not index (system, progress,
    // file-history-snapshot, ...)
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTranscriptEntry {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub content: RawContent,
}

/// Message content is either a plain string or an array of content blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Text(String),
    Blocks(Vec<RawContentBlock>),
}

impl Default for RawContent {
    fn default() -> Self {
        RawContent::Text(String::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum RawContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    // Skip unknown block types gracefully (thinking, tool_result, ...)
    #[serde(other)]
    Other,
}

/// Shape of a planning tool call's input, as far as indexing cares.
#[derive(Debug, Default, Deserialize)]
pub struct RawTodoInput {
    #[serde(default)]
    pub todos: Vec<RawTodoItem>,
}

#[derive(Debug, Deserialize)]
pub struct RawTodoItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ── Line reading ─────────────────────────────────────────────────────────────

/// Read all decodable entries from a transcript, preserving line order.
///
/// Empty lines are skipped; a line that fails to decode is skipped with a
/// debug log. Opening the file can fail; aggregating callers treat that as
/// an empty transcript.
pub fn read_entries(path: &Path) -> std::io::Result<Vec<RawEntry>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut entries = Vec::new();
    for line_result in reader.lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("Failed to read transcript line: {}", e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RawEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::debug!("Skipping unparseable transcript line: {}", e);
            }
        }
    }

    Ok(entries)
}
