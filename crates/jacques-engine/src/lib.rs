//! Session/turn/step reconstruction from normalized parsed entries
//! (SPEC_FULL.md §4.4): turns a flat [`jacques_types::ParsedEntry`] stream
//! into the nested session/turn/step structure archive export and the
//! reconciliation flow build on.

pub mod session;

pub use session::{
    assemble_session, assemble_sessions, summarize, AgentSession, AgentStep, AgentTurn,
    MessageBlock, ReasoningBlock, SessionStats, SessionSummary, SpawnContext, StepStatus,
    ToolCallBlock, ToolExecution, ToolResultBlock, TurnStats, UserMessage,
};
