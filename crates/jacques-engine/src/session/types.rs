use chrono::{DateTime, Utc};
use jacques_types::{ToolCallEntry, ToolResultEntry, UserEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    InProgress,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningBlock {
    pub entry_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBlock {
    pub entry_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallBlock {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: ToolCallEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultBlock {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: ToolResultEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    pub call: ToolCallBlock,
    pub result: Option<ToolResultBlock>,
    pub duration_ms: Option<i64>,
    pub is_error: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub reasoning: Option<ReasoningBlock>,
    pub message: Option<MessageBlock>,
    pub tools: Vec<ToolExecution>,
    /// Sum of `recorded_output_tokens` across this step's assistant
    /// entries — known unreliable (spec.md §9a), kept for a rough
    /// per-step signal only.
    pub approx_output_tokens: u64,
    pub is_failed: bool,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMessage {
    pub entry_id: Uuid,
    pub content: UserEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnStats {
    pub duration_ms: i64,
    pub step_count: usize,
    pub approx_output_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTurn {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user: UserMessage,
    pub steps: Vec<AgentStep>,
    pub stats: TurnStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_turns: usize,
    pub duration_seconds: i64,
    pub approx_output_tokens: u64,
}

/// Where a subagent session's spawning `Task` tool call sits in its
/// parent session (spec.md §3 `TaskToolInfo`): set on the subagent's
/// [`AgentSession`] once its spawn point is correlated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnContext {
    pub turn_index: usize,
    pub step_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSession {
    pub session_id: String,
    pub spawned_by: Option<SpawnContext>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub turns: Vec<AgentTurn>,
    pub stats: SessionStats,
}
