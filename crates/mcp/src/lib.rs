//! MCP server giving coding agents recall of past Claude Code sessions.
//!
//! Scans `~/.claude/projects` for session transcripts, keeps extracted
//! summaries in an mtime-checked in-memory cache, and serves search and
//! message-window navigation as MCP tools over stdio.

pub mod cache;
pub mod config;
pub mod navigate;
pub mod scan;
pub mod search;
pub mod service;

pub use cache::{CacheStats, ConversationCache};
pub use service::RecallService;
