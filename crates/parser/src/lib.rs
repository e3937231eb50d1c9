//! Tolerant parsing of Claude Code session transcripts.
//!
//! The pipeline is [`transcript::read_entries`] (JSONL lines to raw
//! entries) into [`extract::extract_conversation`] (one normalized record
//! per file, chapters included). Navigation re-reads full message bodies
//! with [`messages::collect_messages`].

pub mod chapters;
pub mod extract;
pub mod messages;
pub mod transcript;

pub use extract::extract_conversation;
pub use messages::collect_messages;
pub use transcript::read_entries;
