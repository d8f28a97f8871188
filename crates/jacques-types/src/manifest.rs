use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Compact metadata summary of an archived conversation (GLOSSARY,
/// spec.md §3 "ConversationManifest", budgeted at <= 2 KiB on disk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationManifest {
    pub session_id: String,
    pub project_id: String,
    pub project_slug: String,
    pub project_path: String,
    pub archived_at: DateTime<Utc>,
    pub auto_archived: bool,
    pub title: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub user_questions: Vec<String>,
    pub files_modified: Vec<String>,
    pub tools_used: Vec<String>,
    pub technologies: Vec<String>,
    /// Ids of `PlanEntry` records embedded in this conversation.
    pub plan_ids: Vec<String>,
    pub message_count: usize,
    pub tool_call_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
}
