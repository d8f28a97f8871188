use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::*;

pub struct StepBuilder {
    pub id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub reasoning: Option<ReasoningBlock>,
    pub message: Option<MessageBlock>,
    pub tool_executions: Vec<ToolExecution>,
    pub approx_output_tokens: u64,
}

impl StepBuilder {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            timestamp,
            reasoning: None,
            message: None,
            tool_executions: Vec::new(),
            approx_output_tokens: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.message.is_none() && self.tool_executions.is_empty()
    }

    pub fn build(self) -> AgentStep {
        let id = self.id.unwrap_or_else(Uuid::new_v4);
        let status = self.determine_status();
        let is_failed = self.tool_executions.iter().any(|t| t.is_error);

        AgentStep {
            id,
            timestamp: self.timestamp,
            reasoning: self.reasoning,
            message: self.message,
            tools: self.tool_executions,
            approx_output_tokens: self.approx_output_tokens,
            is_failed,
            status,
        }
    }

    /// Status logic: a tool error fails the step; an unresolved tool call
    /// is in progress; a message with no pending tools is done; reasoning
    /// with nothing else yet is in progress.
    fn determine_status(&self) -> StepStatus {
        if self.tool_executions.iter().any(|t| t.is_error) {
            return StepStatus::Failed;
        }
        if !self.tool_executions.is_empty() {
            if self.tool_executions.iter().any(|t| t.result.is_none()) {
                return StepStatus::InProgress;
            }
            return StepStatus::Done;
        }
        if self.message.is_some() {
            return StepStatus::Done;
        }
        if self.reasoning.is_some() {
            return StepStatus::InProgress;
        }
        StepStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacques_types::{ToolCallEntry, ToolResultEntry};

    fn tool_call(tool_use_id: &str) -> ToolCallBlock {
        ToolCallBlock {
            entry_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            content: ToolCallEntry {
                tool_use_id: tool_use_id.to_string(),
                name: "Bash".to_string(),
                input: serde_json::json!({"command": "ls"}),
            },
        }
    }

    fn tool_result(tool_result_id: &str, is_error: bool) -> ToolResultBlock {
        ToolResultBlock {
            entry_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            content: ToolResultEntry {
                tool_result_id: tool_result_id.to_string(),
                is_error: Some(is_error),
                content: serde_json::Value::String("output".to_string()),
            },
        }
    }

    #[test]
    fn empty_builder_is_empty() {
        assert!(StepBuilder::new(Utc::now()).is_empty());
    }

    #[test]
    fn message_only_step_is_done() {
        let mut builder = StepBuilder::new(Utc::now());
        builder.message = Some(MessageBlock { entry_id: Uuid::new_v4(), content: "hi".to_string() });
        assert_eq!(builder.build().status, StepStatus::Done);
    }

    #[test]
    fn reasoning_only_step_is_in_progress() {
        let mut builder = StepBuilder::new(Utc::now());
        builder.reasoning = Some(ReasoningBlock { entry_id: Uuid::new_v4(), content: "...".to_string() });
        assert_eq!(builder.build().status, StepStatus::InProgress);
    }

    #[test]
    fn tool_without_result_is_in_progress() {
        let mut builder = StepBuilder::new(Utc::now());
        builder.tool_executions.push(ToolExecution {
            call: tool_call("t1"),
            result: None,
            duration_ms: None,
            is_error: false,
        });
        assert_eq!(builder.build().status, StepStatus::InProgress);
    }

    #[test]
    fn tool_with_error_result_fails_step() {
        let mut builder = StepBuilder::new(Utc::now());
        builder.tool_executions.push(ToolExecution {
            call: tool_call("t1"),
            result: Some(tool_result("t1", true)),
            duration_ms: Some(5),
            is_error: true,
        });
        let step = builder.build();
        assert_eq!(step.status, StepStatus::Failed);
        assert!(step.is_failed);
    }

    #[test]
    fn tool_with_ok_result_is_done() {
        let mut builder = StepBuilder::new(Utc::now());
        builder.tool_executions.push(ToolExecution {
            call: tool_call("t1"),
            result: Some(tool_result("t1", false)),
            duration_ms: Some(5),
            is_error: false,
        });
        assert_eq!(builder.build().status, StepStatus::Done);
    }
}
