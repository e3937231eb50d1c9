//! MCP tool surface over the conversation cache.
//!
//! Every tool starts by refreshing the cache, so results always reflect
//! the transcripts currently on disk without any background watcher.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use hindsight_core::{Chapter, ConversationRecord, FinalTodos, Role, SearchResult};

use crate::cache::ConversationCache;
use crate::{navigate, scan, search};

#[derive(Clone)]
pub struct RecallService {
    cache: Arc<Mutex<ConversationCache>>,
    tool_router: ToolRouter<Self>,
}

impl RecallService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            cache: Arc::new(Mutex::new(ConversationCache::new(root))),
            tool_router: Self::tool_router(),
        }
    }

    /// The cache stays usable even if a previous caller panicked mid-call.
    fn cache(&self) -> MutexGuard<'_, ConversationCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[tool_handler]
impl ServerHandler for RecallService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Recall of past Claude Code sessions. Use search_conversations to find \
                 sessions by what they accomplished, get_session_summary for one session's \
                 todos and chapters, get_conversation_context / get_user_turn_context to \
                 read full message windows, and list_recent / list_projects to browse."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input/Output Schemas
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    #[schemars(description = "Whitespace-separated terms, matched case-insensitively")]
    pub query: String,

    #[schemars(description = "Restrict results to one encoded project directory name")]
    pub project: Option<String>,

    #[schemars(description = "Maximum results (default 10, max 50)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SessionSummaryRequest {
    #[schemars(description = "Session id, as returned by search or list tools")]
    pub session_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ContextRequest {
    #[schemars(description = "Session id")]
    pub session_id: String,

    #[schemars(description = "First message position to read (0-based)")]
    pub start: usize,

    #[schemars(description = "Position to stop before (exclusive)")]
    pub end: usize,

    #[schemars(description = "Extra messages to include on each side (default 0)")]
    pub expand: Option<usize>,

    #[schemars(description = "Only return messages with this role: 'user' or 'assistant'")]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TurnContextRequest {
    #[schemars(description = "Session id")]
    pub session_id: String,

    #[schemars(description = "User turn to center on (1-based)")]
    pub turn: usize,

    #[schemars(description = "User turns to include on each side (default 1)")]
    pub radius: Option<usize>,

    #[schemars(description = "Only return messages with this role: 'user' or 'assistant'")]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecentRequest {
    #[schemars(description = "Maximum sessions to return (default 10, max 50)")]
    pub limit: Option<usize>,

    #[schemars(description = "Restrict to one encoded project directory name")]
    pub project: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    results: Vec<SearchResult>,
    total_searched: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionSummaryResponse {
    session_id: String,
    project: String,
    file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    last_modified: String,
    message_count: usize,
    user_message_count: usize,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    final_todos: FinalTodos,
    chapters: Vec<Chapter>,
    user_message_arc: Vec<String>,
}

impl SessionSummaryResponse {
    fn from_record(record: &ConversationRecord) -> Self {
        Self {
            session_id: record.session_id.clone(),
            project: record.project.clone(),
            file_path: record.file_path.display().to_string(),
            timestamp: record.timestamp.clone(),
            last_modified: record.last_modified(),
            message_count: record.message_count,
            user_message_count: record.user_message_count,
            summary: record.summary(),
            title: record.title.clone(),
            final_todos: record.final_todos.clone(),
            chapters: record.chapters.clone(),
            user_message_arc: record.user_message_arc.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentSession {
    session_id: String,
    project: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_message: Option<String>,
    message_count: usize,
    last_modified: String,
}

impl RecentSession {
    fn from_record(record: &ConversationRecord) -> Self {
        Self {
            session_id: record.session_id.clone(),
            project: record.project.clone(),
            summary: record.summary(),
            first_message: record.user_message_arc.first().cloned(),
            message_count: record.message_count,
            last_modified: record.last_modified(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecentResponse {
    sessions: Vec<RecentSession>,
}

#[derive(Debug, Serialize)]
struct ProjectsResponse {
    projects: Vec<String>,
    count: usize,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl RecallService {
    #[tool(
        description = "Search past Claude Code sessions by what they accomplished. Matches query terms against each session's final todo list (or its user messages when no todos exist) and returns ranked hits with session ids."
    )]
    pub async fn search_conversations(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let limit = request.limit.unwrap_or(10).clamp(1, 50);
        let mut cache = self.cache();
        cache.refresh();
        let results = search::search(
            cache.records(),
            &request.query,
            limit,
            request.project.as_deref(),
        );
        Ok(ok_json(&SearchResponse {
            results,
            total_searched: cache.len(),
        }))
    }

    #[tool(
        description = "Summary of one recorded session: final todos, work chapters, user-message arc and message counts."
    )]
    pub async fn get_session_summary(
        &self,
        Parameters(request): Parameters<SessionSummaryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut cache = self.cache();
        cache.refresh();
        match cache.get(&request.session_id) {
            Ok(record) => Ok(ok_json(&SessionSummaryResponse::from_record(record))),
            Err(err) => Ok(fail(format!("Error: {err}"))),
        }
    }

    #[tool(
        description = "Read full messages from a session by absolute position [start, end), optionally expanded on both sides and filtered by role. Chapter startIndex/endIndex values from get_session_summary can be passed straight through."
    )]
    pub async fn get_conversation_context(
        &self,
        Parameters(request): Parameters<ContextRequest>,
    ) -> Result<CallToolResult, McpError> {
        let role = match parse_role(request.role.as_deref()) {
            Ok(role) => role,
            Err(message) => return Ok(fail(message)),
        };
        let mut cache = self.cache();
        cache.refresh();
        let record = match cache.get(&request.session_id) {
            Ok(record) => record,
            Err(err) => return Ok(fail(format!("Error: {err}"))),
        };
        let window = navigate::absolute_range(
            &record.file_path,
            &record.session_id,
            request.start,
            request.end,
            request.expand.unwrap_or(0),
            role,
        );
        match window {
            Ok(window) => Ok(ok_json(&window)),
            Err(err) => Ok(fail(format!("Error: {err}"))),
        }
    }

    #[tool(
        description = "Read full messages around one user turn of a session, radius turns on each side, optionally filtered by role."
    )]
    pub async fn get_user_turn_context(
        &self,
        Parameters(request): Parameters<TurnContextRequest>,
    ) -> Result<CallToolResult, McpError> {
        let role = match parse_role(request.role.as_deref()) {
            Ok(role) => role,
            Err(message) => return Ok(fail(message)),
        };
        let mut cache = self.cache();
        cache.refresh();
        let record = match cache.get(&request.session_id) {
            Ok(record) => record,
            Err(err) => return Ok(fail(format!("Error: {err}"))),
        };
        let window = navigate::turn_centered(
            &record.file_path,
            &record.session_id,
            request.turn,
            request.radius.unwrap_or(1),
            role,
        );
        match window {
            Ok(window) => Ok(ok_json(&window)),
            Err(err) => Ok(fail(format!("Error: {err}"))),
        }
    }

    #[tool(description = "List the most recently modified sessions, newest first.")]
    pub async fn list_recent(
        &self,
        Parameters(request): Parameters<RecentRequest>,
    ) -> Result<CallToolResult, McpError> {
        let limit = request.limit.unwrap_or(10).clamp(1, 50);
        let mut cache = self.cache();
        cache.refresh();
        let mut records: Vec<&ConversationRecord> = cache
            .records()
            .filter(|record| {
                request
                    .project
                    .as_deref()
                    .is_none_or(|p| record.project == p)
            })
            .collect();
        records.sort_by(|a, b| b.mtime.cmp(&a.mtime));
        records.truncate(limit);
        let sessions: Vec<RecentSession> =
            records.into_iter().map(RecentSession::from_record).collect();
        Ok(ok_json(&RecentResponse { sessions }))
    }

    #[tool(description = "List the project directories that have recorded sessions.")]
    pub async fn list_projects(&self) -> Result<CallToolResult, McpError> {
        let mut cache = self.cache();
        cache.refresh();
        let projects = scan::list_projects(cache.root());
        let count = projects.len();
        Ok(ok_json(&ProjectsResponse { projects, count }))
    }
}

fn parse_role(value: Option<&str>) -> Result<Option<Role>, String> {
    match value {
        None => Ok(None),
        Some(raw) => Role::parse(raw).map(Some).ok_or_else(|| {
            format!("Error: unknown role filter '{raw}' (expected 'user' or 'assistant')")
        }),
    }
}

fn ok_json<T: Serialize>(value: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )])
}

fn fail(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}
