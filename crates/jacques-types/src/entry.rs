use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One normalized unit of transcript content (spec.md §3 "ParsedEntry").
///
/// Every entry carries a UUID, parent UUID (null at root), ISO timestamp,
/// owning session id, and a typed payload; the payload discriminates the
/// entry kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEntry {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub payload: EntryPayload,
}

/// Normalized payload variants recognised by the Transcript Parser
/// (spec.md §4.4 "Entry types recognised").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryPayload {
    User(UserEntry),
    Assistant(AssistantEntry),
    ToolCall(ToolCallEntry),
    ToolResult(ToolResultEntry),
    HookProgress(HookProgressEntry),
    AgentProgress(AgentProgressEntry),
    BashProgress(BashProgressEntry),
    McpProgress(McpProgressEntry),
    WebSearchQuery(WebSearchQueryEntry),
    WebSearchResults(WebSearchResultsEntry),
    TurnDuration(TurnDurationEntry),
    System(SystemEntry),
    Summary(SummaryEntry),
    /// Unrecognised/structurally-invalid entries normalize to `skip`
    /// (spec.md §4.4, §9) rather than failing the parse.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub text: String,
    /// True for queue-operations with no nested message, and for messages
    /// whose first token is one of the internal-command markers (spec.md
    /// §4.4 tie-breaks) — still counted toward the token account, but
    /// filtered from display/archive views by downstream consumers.
    pub internal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Raw recorded `output_tokens` for this streaming entry — known
    /// unreliable (spec.md §9a), kept for completeness.
    pub recorded_output_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallEntry {
    pub tool_use_id: String,
    pub name: String,
    pub input: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultEntry {
    pub tool_result_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    pub content: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookProgressEntry {
    pub hook_name: String,
    pub detail: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProgressEntry {
    pub parent_tool_use_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_description: Option<String>,
    pub detail: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BashProgressEntry {
    pub chunk: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpProgressEntry {
    pub server: String,
    pub detail: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchQueryEntry {
    pub tool_use_id: String,
    pub query: String,
}

/// Pair of `{title, url}` extracted from a web-search tool result
/// (spec.md §3 "WebSearchResult").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUrl {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResultsEntry {
    pub parent_tool_use_id: String,
    pub result_count: u64,
    #[serde(default)]
    pub search_urls: Vec<SearchUrl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnDurationEntry {
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEntry {
    pub subtype: String,
    pub detail: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_uuid: Option<Uuid>,
}
