pub mod assembler;
mod stats;
mod step_builder;
pub mod summary;
mod turn_builder;
pub mod types;

pub use assembler::{assemble_session, assemble_sessions};
pub use summary::{summarize, SessionSummary};
pub use types::{
    AgentSession, AgentStep, AgentTurn, MessageBlock, ReasoningBlock, SessionStats, SpawnContext,
    StepStatus, ToolCallBlock, ToolExecution, ToolResultBlock, TurnStats, UserMessage,
};
