use std::collections::HashMap;

use chrono::{DateTime, Utc};
use jacques_types::EntryPayload;
use uuid::Uuid;

use super::stats::calculate_turn_stats;
use super::step_builder::StepBuilder;
use super::types::*;

pub struct TurnBuilder {
    id: Uuid,
    timestamp: DateTime<Utc>,
    user: UserMessage,

    steps: Vec<StepBuilder>,
    current_step: StepBuilder,

    pending_calls: HashMap<String, (usize, usize)>,
}

impl TurnBuilder {
    pub fn new(id: Uuid, timestamp: DateTime<Utc>, user: UserMessage) -> Self {
        Self {
            id,
            timestamp,
            user,
            steps: Vec::new(),
            current_step: StepBuilder::new(timestamp),
            pending_calls: HashMap::new(),
        }
    }

    pub fn add_entry(&mut self, entry_id: Uuid, timestamp: DateTime<Utc>, payload: &EntryPayload) {
        match payload {
            EntryPayload::Assistant(assistant) => {
                if let Some(thinking) = &assistant.thinking {
                    self.ensure_new_step_if_needed(timestamp);
                    if self.current_step.id.is_none() {
                        self.current_step.id = Some(entry_id);
                    }
                    self.current_step.reasoning = Some(ReasoningBlock {
                        entry_id,
                        content: thinking.clone(),
                    });
                }

                if let Some(text) = &assistant.text {
                    if self.current_step.message.is_some() {
                        self.start_new_step(timestamp);
                    }
                    if self.current_step.id.is_none() {
                        self.current_step.id = Some(entry_id);
                    }
                    self.current_step.message = Some(MessageBlock {
                        entry_id,
                        content: text.clone(),
                    });
                }

                self.current_step.approx_output_tokens += assistant.recorded_output_tokens;
            }

            EntryPayload::ToolCall(tool_call) => {
                if self.current_step.id.is_none() {
                    self.current_step.id = Some(entry_id);
                }

                let already_exists = self
                    .current_step
                    .tool_executions
                    .iter()
                    .any(|t| t.call.entry_id == entry_id);
                if already_exists {
                    return;
                }

                let call_block = ToolCallBlock {
                    entry_id,
                    timestamp,
                    content: tool_call.clone(),
                };

                let call_idx = self.current_step.tool_executions.len();
                self.current_step.tool_executions.push(ToolExecution {
                    call: call_block,
                    result: None,
                    duration_ms: None,
                    is_error: false,
                });

                self.pending_calls
                    .insert(tool_call.tool_use_id.clone(), (self.steps.len(), call_idx));
            }

            EntryPayload::ToolResult(tool_result) => {
                let result_block = ToolResultBlock {
                    entry_id,
                    timestamp,
                    content: tool_result.clone(),
                };

                if let Some(&(step_idx, call_idx)) =
                    self.pending_calls.get(&tool_result.tool_result_id)
                {
                    let target_step = if step_idx < self.steps.len() {
                        &mut self.steps[step_idx]
                    } else {
                        &mut self.current_step
                    };

                    if let Some(exec) = target_step.tool_executions.get_mut(call_idx) {
                        let duration = (timestamp - exec.call.timestamp).num_milliseconds();
                        exec.is_error = tool_result.is_error.unwrap_or(false);
                        exec.result = Some(result_block);
                        exec.duration_ms = Some(duration);
                    }

                    self.pending_calls.remove(&tool_result.tool_result_id);
                }
            }

            // Progress/notification-style entries carry no step structure.
            EntryPayload::HookProgress(_)
            | EntryPayload::AgentProgress(_)
            | EntryPayload::BashProgress(_)
            | EntryPayload::McpProgress(_)
            | EntryPayload::WebSearchQuery(_)
            | EntryPayload::WebSearchResults(_)
            | EntryPayload::TurnDuration(_)
            | EntryPayload::System(_)
            | EntryPayload::Summary(_)
            | EntryPayload::Skip => {}

            EntryPayload::User(_) => unreachable!("user entries start new turns, not steps"),
        }
    }

    fn ensure_new_step_if_needed(&mut self, timestamp: DateTime<Utc>) {
        if self.current_step.reasoning.is_some() {
            self.start_new_step(timestamp);
        }
    }

    fn start_new_step(&mut self, timestamp: DateTime<Utc>) {
        if self.current_step.is_empty() {
            return;
        }
        let completed = std::mem::replace(&mut self.current_step, StepBuilder::new(timestamp));
        self.steps.push(completed);
    }

    pub fn build(mut self) -> Option<AgentTurn> {
        if !self.current_step.is_empty() {
            self.steps.push(self.current_step);
        }

        if self.steps.is_empty() {
            return None;
        }

        let completed_steps: Vec<AgentStep> = self.steps.into_iter().map(|b| b.build()).collect();
        let stats = calculate_turn_stats(&completed_steps, self.timestamp);

        Some(AgentTurn {
            id: self.id,
            timestamp: self.timestamp,
            user: self.user,
            steps: completed_steps,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacques_types::{AssistantEntry, UserEntry};

    fn user_message() -> UserMessage {
        UserMessage {
            entry_id: Uuid::new_v4(),
            content: UserEntry { text: "Hello".to_string(), internal: false },
        }
    }

    #[test]
    fn empty_turn_builds_none() {
        let builder = TurnBuilder::new(Uuid::new_v4(), Utc::now(), user_message());
        assert!(builder.build().is_none());
    }

    #[test]
    fn message_entry_produces_one_step() {
        let timestamp = Utc::now();
        let mut builder = TurnBuilder::new(Uuid::new_v4(), timestamp, user_message());

        builder.add_entry(
            Uuid::new_v4(),
            timestamp,
            &EntryPayload::Assistant(AssistantEntry {
                text: Some("Response".to_string()),
                thinking: None,
                recorded_output_tokens: 12,
            }),
        );

        let turn = builder.build().unwrap();
        assert_eq!(turn.steps.len(), 1);
        assert!(turn.steps[0].message.is_some());
        assert_eq!(turn.steps[0].approx_output_tokens, 12);
    }

    #[test]
    fn second_message_in_same_turn_starts_new_step() {
        let timestamp = Utc::now();
        let mut builder = TurnBuilder::new(Uuid::new_v4(), timestamp, user_message());

        for text in ["first", "second"] {
            builder.add_entry(
                Uuid::new_v4(),
                timestamp,
                &EntryPayload::Assistant(AssistantEntry {
                    text: Some(text.to_string()),
                    thinking: None,
                    recorded_output_tokens: 1,
                }),
            );
        }

        let turn = builder.build().unwrap();
        assert_eq!(turn.steps.len(), 2);
    }
}
