//! Shared data model for Claude Code session recall.
//!
//! A session transcript on disk becomes a [`ConversationRecord`]: counts,
//! a user-message arc, todo snapshots, their final partition, and derived
//! work chapters. Navigation re-reads transcripts into
//! [`TranscriptMessage`] lists; search produces [`SearchResult`]s.

pub mod error;
pub mod message;
pub mod record;

pub use error::RecallError;
pub use message::{Role, TranscriptMessage};
pub use record::{
    Chapter, ConversationRecord, FinalTodos, SearchResult, TodoItem, TodoSnapshot, TodoStatus,
};
