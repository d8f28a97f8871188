use std::collections::HashMap;

use jacques_types::{EntryPayload, ParsedEntry};

use super::stats::calculate_session_stats;
use super::turn_builder::TurnBuilder;
use super::types::*;

/// Assembles every session reachable from a flat entry stream into one
/// [`AgentSession`] per distinct `session_id`.
///
/// `main_session_id` names the top-level session; every other session_id
/// found among `entries` is treated as a subagent transcript and its
/// `spawned_by` is resolved by scanning the main session's tool results for
/// a `Task` call whose result carries that session_id as its `agentId`.
pub fn assemble_sessions(entries: &[ParsedEntry], main_session_id: &str) -> Vec<AgentSession> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut by_session: HashMap<String, Vec<&ParsedEntry>> = HashMap::new();
    for entry in entries {
        by_session.entry(entry.session_id.clone()).or_default().push(entry);
    }

    let main_entries = by_session.get(main_session_id).cloned().unwrap_or_default();
    let spawn_map = build_spawn_context_map(&main_entries);

    let mut sessions: Vec<AgentSession> = by_session
        .into_iter()
        .filter_map(|(session_id, session_entries)| {
            let spawned_by = spawn_map.get(&session_id).copied();
            assemble_session_for_entries(&session_id, &session_entries, spawned_by)
        })
        .collect();

    sessions.sort_by(|a, b| {
        use std::cmp::Ordering;
        match (a.session_id == main_session_id, b.session_id == main_session_id) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => a.start_time.cmp(&b.start_time),
        }
    });

    sessions
}

/// Assembles a single session from its own entries only (no subagent
/// correlation attempted).
pub fn assemble_session(entries: &[ParsedEntry]) -> Option<AgentSession> {
    let session_id = entries.first()?.session_id.clone();
    assemble_session_for_entries(&session_id, &entries.iter().collect::<Vec<_>>(), None)
}

/// Scans a session's tool results for `{"agentId": "<subagent session id>"}`
/// and records where in the session's turn/step structure that `Task` call
/// resolved, so the subagent session can point back to its spawn point.
fn build_spawn_context_map(entries: &[&ParsedEntry]) -> HashMap<String, SpawnContext> {
    let mut spawn_map = HashMap::new();
    let turns = build_turns(entries);

    for (turn_idx, turn) in turns.iter().enumerate() {
        for (step_idx, step) in turn.steps.iter().enumerate() {
            for tool in &step.tools {
                let Some(result) = &tool.result else { continue };
                let Some(agent_id) = result.content.content.get("agentId").and_then(|v| v.as_str())
                else {
                    continue;
                };
                spawn_map.insert(
                    agent_id.to_string(),
                    SpawnContext { turn_index: turn_idx, step_index: step_idx },
                );
            }
        }
    }

    spawn_map
}

fn assemble_session_for_entries(
    session_id: &str,
    entries: &[&ParsedEntry],
    spawned_by: Option<SpawnContext>,
) -> Option<AgentSession> {
    if entries.is_empty() {
        return None;
    }

    let start_time = entries.first()?.timestamp;
    let end_time = entries.last().map(|e| e.timestamp);

    let turns = build_turns(entries);
    let stats = calculate_session_stats(&turns, start_time, end_time);

    Some(AgentSession {
        session_id: session_id.to_string(),
        spawned_by,
        start_time,
        end_time,
        turns,
        stats,
    })
}

fn build_turns(entries: &[&ParsedEntry]) -> Vec<AgentTurn> {
    let mut turns = Vec::new();
    let mut current_turn: Option<TurnBuilder> = None;

    for entry in entries {
        match &entry.payload {
            EntryPayload::User(user) => {
                if user.internal {
                    // Internal/queue-op entries never open a new turn; they still
                    // count toward the token account elsewhere.
                    continue;
                }

                if let Some(builder) = current_turn.take()
                    && let Some(turn) = builder.build()
                {
                    turns.push(turn);
                }

                current_turn = Some(TurnBuilder::new(
                    entry.id,
                    entry.timestamp,
                    UserMessage { entry_id: entry.id, content: user.clone() },
                ));
            }
            _ => {
                if let Some(ref mut builder) = current_turn {
                    builder.add_entry(entry.id, entry.timestamp, &entry.payload);
                }
            }
        }
    }

    if let Some(builder) = current_turn
        && let Some(turn) = builder.build()
    {
        turns.push(turn);
    }

    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jacques_types::{AssistantEntry, ToolCallEntry, ToolResultEntry, UserEntry};
    use uuid::Uuid;

    fn entry(session_id: &str, payload: EntryPayload) -> ParsedEntry {
        ParsedEntry {
            id: Uuid::new_v4(),
            parent_id: None,
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            payload,
        }
    }

    #[test]
    fn single_session_single_turn() {
        let entries = vec![
            entry("main", EntryPayload::User(UserEntry { text: "hi".into(), internal: false })),
            entry(
                "main",
                EntryPayload::Assistant(AssistantEntry {
                    text: Some("hello".into()),
                    thinking: None,
                    recorded_output_tokens: 3,
                }),
            ),
        ];

        let sessions = assemble_sessions(&entries, "main");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].turns.len(), 1);
        assert!(sessions[0].spawned_by.is_none());
    }

    #[test]
    fn subagent_session_resolves_spawn_context() {
        let entries = vec![
            entry("main", EntryPayload::User(UserEntry { text: "go".into(), internal: false })),
            entry(
                "main",
                EntryPayload::ToolCall(ToolCallEntry {
                    tool_use_id: "call-1".into(),
                    name: "Task".into(),
                    input: serde_json::json!({}),
                }),
            ),
            entry(
                "main",
                EntryPayload::ToolResult(ToolResultEntry {
                    tool_result_id: "call-1".into(),
                    is_error: None,
                    content: serde_json::json!({"agentId": "sub-1"}),
                }),
            ),
            entry("sub-1", EntryPayload::User(UserEntry { text: "sub task".into(), internal: false })),
        ];

        let sessions = assemble_sessions(&entries, "main");
        let sub = sessions.iter().find(|s| s.session_id == "sub-1").unwrap();
        let spawn = sub.spawned_by.expect("spawn context should resolve");
        assert_eq!(spawn.turn_index, 0);
        assert_eq!(spawn.step_index, 0);
    }
}
