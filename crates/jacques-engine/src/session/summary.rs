use serde::{Deserialize, Serialize};

use super::types::AgentSession;

/// Statistical summary of a session's entry composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub entry_counts: EntryCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryCounts {
    pub total: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub tool_calls: usize,
    pub reasoning_blocks: usize,
}

/// Counts turns, steps and tool calls in an already-assembled session.
pub fn summarize(session: &AgentSession) -> SessionSummary {
    let user_count = session.turns.len();
    let mut assistant_count = 0;
    let mut tool_call_count = 0;
    let mut reasoning_count = 0;
    let mut total = 0;

    for turn in &session.turns {
        total += 1;
        for step in &turn.steps {
            if step.message.is_some() {
                assistant_count += 1;
                total += 1;
            }
            if step.reasoning.is_some() {
                reasoning_count += 1;
                total += 1;
            }
            tool_call_count += step.tools.len();
            total += step.tools.len() * 2;
        }
    }

    SessionSummary {
        entry_counts: EntryCounts {
            total,
            user_messages: user_count,
            assistant_messages: assistant_count,
            tool_calls: tool_call_count,
            reasoning_blocks: reasoning_count,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::assembler::assemble_session;
    use chrono::Utc;
    use jacques_types::{AssistantEntry, EntryPayload, ParsedEntry, UserEntry};
    use uuid::Uuid;

    #[test]
    fn summarize_counts_turns_and_messages() {
        let entries = vec![
            ParsedEntry {
                id: Uuid::new_v4(),
                parent_id: None,
                timestamp: Utc::now(),
                session_id: "s1".into(),
                payload: EntryPayload::User(UserEntry { text: "hi".into(), internal: false }),
            },
            ParsedEntry {
                id: Uuid::new_v4(),
                parent_id: None,
                timestamp: Utc::now(),
                session_id: "s1".into(),
                payload: EntryPayload::Assistant(AssistantEntry {
                    text: Some("hello".into()),
                    thinking: None,
                    recorded_output_tokens: 1,
                }),
            },
        ];

        let session = assemble_session(&entries).unwrap();
        let summary = summarize(&session);
        assert_eq!(summary.entry_counts.user_messages, 1);
        assert_eq!(summary.entry_counts.assistant_messages, 1);
    }
}
