use chrono::{DateTime, Utc};
use jacques_types::{
    AssistantEntry, BashProgressEntry, EntryPayload, HookProgressEntry, McpProgressEntry,
    ParsedEntry, SearchUrl, SummaryEntry, SystemEntry, ToolCallEntry, ToolResultEntry,
    TurnDurationEntry, UserEntry, WebSearchResultsEntry,
};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use crate::claude::schema::*;

const NAMESPACE: Uuid = Uuid::from_bytes([
    0x6a, 0x61, 0x63, 0x71, 0x75, 0x65, 0x73, 0x2d, 0x63, 0x6c, 0x61, 0x75, 0x64, 0x65, 0x00, 0x00,
]);

fn derive_uuid(seed: &str) -> Uuid {
    Uuid::new_v5(&NAMESPACE, seed.as_bytes())
}

fn parse_uuid(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|_| derive_uuid(raw))
}

fn parse_timestamp(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Internal-command markers that flag a user message as non-display
/// (spec.md §4.4 tie-breaks).
const INTERNAL_MARKERS: &[&str] = &["<command-name>", "<local-command-stdout>"];

fn is_internal_user_text(text: &str) -> bool {
    INTERNAL_MARKERS
        .iter()
        .any(|m| text.trim_start().starts_with(m))
}

/// Pass 1 lookup tables built from the full record set before any entry
/// is emitted (spec.md §4.4): `Task` tool calls keyed by their
/// `tool_use_id`, and `WebSearch` queries keyed the same way so their
/// paired `tool_result` can be re-attached as structured search URLs.
struct LinkTables {
    #[allow(dead_code)]
    task_calls: HashMap<String, String>,
    search_queries: HashMap<String, String>,
}

fn build_link_tables(records: &[ClaudeRecord]) -> LinkTables {
    let mut task_calls = HashMap::new();
    let mut search_queries = HashMap::new();

    for record in records {
        if let ClaudeRecord::Assistant(asst) = record {
            for content in &asst.message.content {
                if let AssistantContent::ToolUse { id, name, input, .. } = content {
                    if name == "Task" {
                        let desc = input
                            .get("description")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string();
                        task_calls.insert(id.clone(), desc);
                    } else if name == "WebSearch" {
                        let query = input
                            .get("query")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string();
                        search_queries.insert(id.clone(), query);
                    }
                }
            }
        }
    }

    LinkTables {
        task_calls,
        search_queries,
    }
}

/// Extract `{title, url}` pairs from a tool-result content value,
/// regardless of whether it arrived as a bare string, an array of blocks,
/// or a single object (spec.md §4.4 "ToolUseResult").
fn extract_search_urls(value: &serde_json::Value) -> Vec<SearchUrl> {
    let mut urls = Vec::new();
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                if let (Some(title), Some(url)) = (
                    item.get("title").and_then(|v| v.as_str()),
                    item.get("url").and_then(|v| v.as_str()),
                ) {
                    urls.push(SearchUrl {
                        title: title.to_string(),
                        url: url.to_string(),
                    });
                }
            }
        }
        serde_json::Value::Object(_) => {
            if let (Some(title), Some(url)) = (
                value.get("title").and_then(|v| v.as_str()),
                value.get("url").and_then(|v| v.as_str()),
            ) {
                urls.push(SearchUrl {
                    title: title.to_string(),
                    url: url.to_string(),
                });
            }
        }
        _ => {}
    }
    urls
}

/// Pass 2: normalize raw vendor records into [`ParsedEntry`] values,
/// using the pass-1 link tables to resolve `Task`/`WebSearch` pairings
/// (spec.md §4.4).
pub(crate) fn normalize_claude_records(records: Vec<ClaudeRecord>) -> Vec<ParsedEntry> {
    let links = build_link_tables(&records);
    let mut entries = Vec::with_capacity(records.len());

    let fallback_session_id = records
        .iter()
        .find_map(|r| match r {
            ClaudeRecord::User(u) => Some(u.session_id.clone()),
            ClaudeRecord::Assistant(a) => Some(a.session_id.clone()),
            ClaudeRecord::System(s) => Some(s.session_id.clone()),
            ClaudeRecord::Progress(p) => Some(p.session_id.clone()),
            ClaudeRecord::QueueOperation(q) => Some(q.session_id.clone()),
            ClaudeRecord::Summary(s) => s.session_id.clone(),
            _ => None,
        })
        .unwrap_or_else(|| "unknown".to_string());

    for record in records {
        match record {
            ClaudeRecord::User(user) => {
                let timestamp = parse_timestamp(&user.timestamp);
                let parent_id = user.parent_uuid.as_deref().map(parse_uuid);

                for (idx, content) in user.message.content.iter().enumerate() {
                    let id = derive_uuid(&format!("{}-{}", user.uuid, idx));
                    match content {
                        UserContent::Text { text } => {
                            entries.push(ParsedEntry {
                                id,
                                parent_id,
                                timestamp,
                                session_id: user.session_id.clone(),
                                payload: EntryPayload::User(UserEntry {
                                    text: text.clone(),
                                    internal: user.is_meta || is_internal_user_text(text),
                                }),
                            });
                        }
                        UserContent::ToolResult {
                            tool_use_id,
                            content: result,
                            is_error,
                            ..
                        } => {
                            if links.search_queries.contains_key(tool_use_id) {
                                let urls = result
                                    .as_ref()
                                    .map(extract_search_urls)
                                    .unwrap_or_default();
                                entries.push(ParsedEntry {
                                    id,
                                    parent_id,
                                    timestamp,
                                    session_id: user.session_id.clone(),
                                    payload: EntryPayload::WebSearchResults(
                                        WebSearchResultsEntry {
                                            parent_tool_use_id: tool_use_id.clone(),
                                            result_count: urls.len() as u64,
                                            search_urls: urls,
                                        },
                                    ),
                                });
                            } else {
                                entries.push(ParsedEntry {
                                    id,
                                    parent_id,
                                    timestamp,
                                    session_id: user.session_id.clone(),
                                    payload: EntryPayload::ToolResult(ToolResultEntry {
                                        tool_result_id: tool_use_id.clone(),
                                        is_error: Some(*is_error),
                                        content: result.clone().unwrap_or(serde_json::Value::Null),
                                    }),
                                });
                            }
                        }
                        UserContent::Image { .. } | UserContent::Unknown => {}
                    }
                }
            }

            ClaudeRecord::Assistant(asst) => {
                let timestamp = parse_timestamp(&asst.timestamp);
                let parent_id = asst.parent_uuid.as_deref().map(parse_uuid);
                let recorded_output_tokens = asst
                    .message
                    .usage
                    .as_ref()
                    .map(|u| u.output_tokens as u64)
                    .unwrap_or(0);

                for (idx, content) in asst.message.content.iter().enumerate() {
                    let id = derive_uuid(&format!("{}-{}", asst.uuid, idx));
                    match content {
                        AssistantContent::Text { text, .. } => {
                            entries.push(ParsedEntry {
                                id,
                                parent_id,
                                timestamp,
                                session_id: asst.session_id.clone(),
                                payload: EntryPayload::Assistant(AssistantEntry {
                                    text: Some(text.clone()),
                                    thinking: None,
                                    recorded_output_tokens,
                                }),
                            });
                        }
                        AssistantContent::Thinking { thinking, .. } => {
                            entries.push(ParsedEntry {
                                id,
                                parent_id,
                                timestamp,
                                session_id: asst.session_id.clone(),
                                payload: EntryPayload::Assistant(AssistantEntry {
                                    text: None,
                                    thinking: Some(thinking.clone()),
                                    recorded_output_tokens,
                                }),
                            });
                        }
                        AssistantContent::ToolUse {
                            id: tool_use_id,
                            name,
                            input,
                            ..
                        } => {
                            entries.push(ParsedEntry {
                                id,
                                parent_id,
                                timestamp,
                                session_id: asst.session_id.clone(),
                                payload: EntryPayload::ToolCall(ToolCallEntry {
                                    tool_use_id: tool_use_id.clone(),
                                    name: name.clone(),
                                    input: input.clone(),
                                }),
                            });
                        }
                        AssistantContent::ToolResult {
                            tool_use_id,
                            content: output,
                            is_error,
                        } => {
                            entries.push(ParsedEntry {
                                id,
                                parent_id,
                                timestamp,
                                session_id: asst.session_id.clone(),
                                payload: EntryPayload::ToolResult(ToolResultEntry {
                                    tool_result_id: tool_use_id.clone(),
                                    is_error: Some(*is_error),
                                    content: serde_json::Value::String(output.clone()),
                                }),
                            });
                        }
                        AssistantContent::Unknown => {}
                    }
                }
            }

            ClaudeRecord::System(sys) => {
                let timestamp = parse_timestamp(&sys.timestamp);
                let id = derive_uuid(&sys.uuid);
                if sys.subtype == "turn_duration" {
                    entries.push(ParsedEntry {
                        id,
                        parent_id: None,
                        timestamp,
                        session_id: sys.session_id.clone(),
                        payload: EntryPayload::TurnDuration(TurnDurationEntry {
                            duration_ms: sys.duration_ms.unwrap_or(0),
                        }),
                    });
                } else {
                    entries.push(ParsedEntry {
                        id,
                        parent_id: None,
                        timestamp,
                        session_id: sys.session_id.clone(),
                        payload: EntryPayload::System(SystemEntry {
                            subtype: sys.subtype.clone(),
                            detail: sys
                                .content
                                .clone()
                                .map(serde_json::Value::String)
                                .unwrap_or(serde_json::Value::Null),
                        }),
                    });
                }
            }

            ClaudeRecord::Progress(prog) => {
                let timestamp = parse_timestamp(&prog.timestamp);
                let id = derive_uuid(&prog.uuid);
                let payload = match &prog.data {
                    ProgressData::HookProgress {
                        hook_event,
                        hook_name,
                        command,
                    } => EntryPayload::HookProgress(HookProgressEntry {
                        hook_name: hook_name.clone().unwrap_or_else(|| hook_event.clone()),
                        detail: serde_json::json!({ "hookEvent": hook_event, "command": command }),
                    }),
                    ProgressData::AgentProgress {
                        parent_tool_use_id,
                        agent_type,
                        agent_description,
                    } => EntryPayload::AgentProgress(jacques_types::AgentProgressEntry {
                        parent_tool_use_id: parent_tool_use_id.clone().unwrap_or_default(),
                        agent_type: agent_type.clone(),
                        agent_description: agent_description.clone(),
                        detail: serde_json::Value::Null,
                    }),
                    ProgressData::BashProgress { chunk } => {
                        EntryPayload::BashProgress(BashProgressEntry {
                            chunk: chunk.clone().unwrap_or_default(),
                        })
                    }
                    ProgressData::McpProgress { server } => {
                        EntryPayload::McpProgress(McpProgressEntry {
                            server: server.clone().unwrap_or_default(),
                            detail: serde_json::Value::Null,
                        })
                    }
                    ProgressData::Other => EntryPayload::Skip,
                };

                entries.push(ParsedEntry {
                    id,
                    parent_id: None,
                    timestamp,
                    session_id: prog.session_id.clone(),
                    payload,
                });
            }

            ClaudeRecord::QueueOperation(queue) => {
                let timestamp = parse_timestamp(&queue.timestamp);
                let id = derive_uuid(&format!("queue-{}-{}", queue.session_id, queue.timestamp));
                // A queue-operation with no nested message still counts
                // toward the token account but is flagged internal
                // (spec.md §4.4 tie-break).
                entries.push(ParsedEntry {
                    id,
                    parent_id: None,
                    timestamp,
                    session_id: queue.session_id.clone(),
                    payload: EntryPayload::User(UserEntry {
                        text: queue.content.clone().unwrap_or_default(),
                        internal: true,
                    }),
                });
            }

            ClaudeRecord::Summary(summary) => {
                let timestamp = summary
                    .timestamp
                    .as_ref()
                    .map(|ts| parse_timestamp(ts))
                    .unwrap_or_else(Utc::now);
                let id = derive_uuid(summary.leaf_uuid.as_deref().unwrap_or(&summary.summary));
                entries.push(ParsedEntry {
                    id,
                    parent_id: None,
                    timestamp,
                    session_id: summary
                        .session_id
                        .clone()
                        .unwrap_or_else(|| fallback_session_id.clone()),
                    payload: EntryPayload::Summary(SummaryEntry {
                        summary: summary.summary.clone(),
                        leaf_uuid: summary.leaf_uuid.as_deref().map(parse_uuid),
                    }),
                });
            }

            ClaudeRecord::FileHistorySnapshot(_) | ClaudeRecord::Unknown => {
                // No spec.md entry-type counterpart; dropped rather than
                // surfaced as Skip noise (spec.md §4.4, §9: "unrecognised
                // entries normalize to skip" covers malformed input, not
                // known-irrelevant vendor record types).
            }
        }
    }

    entries
}

/// Claude session parser implementation.
pub struct ClaudeParser;

impl crate::traits::SessionParser for ClaudeParser {
    fn parse_file(&self, path: &Path) -> anyhow::Result<Vec<ParsedEntry>> {
        Ok(super::io::normalize_claude_file(path)?)
    }

    fn parse_record(&self, content: &str) -> anyhow::Result<Option<ParsedEntry>> {
        let record: ClaudeRecord = match serde_json::from_str(content) {
            Ok(r) => r,
            Err(_) => return Ok(None),
        };
        Ok(normalize_claude_records(vec![record]).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_user_text() {
        let records = vec![ClaudeRecord::User(UserRecord {
            uuid: "u1".to_string(),
            parent_uuid: None,
            session_id: "s1".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            message: UserMessage {
                role: "user".to_string(),
                content: vec![UserContent::Text {
                    text: "Hello".to_string(),
                }],
            },
            is_sidechain: false,
            is_meta: false,
            agent_id: None,
            cwd: None,
            git_branch: None,
            user_type: None,
            version: None,
            tool_use_result: None,
        })];

        let entries = normalize_claude_records(records);
        assert_eq!(entries.len(), 1);
        match &entries[0].payload {
            EntryPayload::User(u) => {
                assert_eq!(u.text, "Hello");
                assert!(!u.internal);
            }
            _ => panic!("expected user entry"),
        }
    }

    #[test]
    fn flags_internal_command_prefixed_text() {
        let records = vec![ClaudeRecord::User(UserRecord {
            uuid: "u1".to_string(),
            parent_uuid: None,
            session_id: "s1".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            message: UserMessage {
                role: "user".to_string(),
                content: vec![UserContent::Text {
                    text: "<command-name>/commit</command-name>".to_string(),
                }],
            },
            is_sidechain: false,
            is_meta: false,
            agent_id: None,
            cwd: None,
            git_branch: None,
            user_type: None,
            version: None,
            tool_use_result: None,
        })];

        let entries = normalize_claude_records(records);
        match &entries[0].payload {
            EntryPayload::User(u) => assert!(u.internal),
            _ => panic!("expected user entry"),
        }
    }

    #[test]
    fn pairs_web_search_query_with_result() {
        let records = vec![
            ClaudeRecord::Assistant(AssistantRecord {
                uuid: "a1".to_string(),
                parent_uuid: None,
                session_id: "s1".to_string(),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                message: AssistantMessage {
                    message_type: "message".to_string(),
                    id: "m1".to_string(),
                    role: "assistant".to_string(),
                    model: "claude-x".to_string(),
                    content: vec![AssistantContent::ToolUse {
                        id: "tool_1".to_string(),
                        name: "WebSearch".to_string(),
                        input: serde_json::json!({"query": "rust async"}),
                        signature: None,
                    }],
                    stop_reason: None,
                    usage: None,
                },
                is_sidechain: false,
                agent_id: None,
                cwd: None,
                git_branch: None,
            }),
            ClaudeRecord::User(UserRecord {
                uuid: "u1".to_string(),
                parent_uuid: None,
                session_id: "s1".to_string(),
                timestamp: "2024-01-01T00:00:01Z".to_string(),
                message: UserMessage {
                    role: "user".to_string(),
                    content: vec![UserContent::ToolResult {
                        tool_use_id: "tool_1".to_string(),
                        content: Some(serde_json::json!([
                            {"title": "Rust Async Book", "url": "https://example.com"}
                        ])),
                        is_error: false,
                        agent_id: None,
                    }],
                },
                is_sidechain: false,
                is_meta: false,
                agent_id: None,
                cwd: None,
                git_branch: None,
                user_type: None,
                version: None,
                tool_use_result: None,
            }),
        ];

        let entries = normalize_claude_records(records);
        assert_eq!(entries.len(), 2);
        match &entries[1].payload {
            EntryPayload::WebSearchResults(w) => {
                assert_eq!(w.result_count, 1);
                assert_eq!(w.search_urls[0].title, "Rust Async Book");
            }
            other => panic!("expected web search results, got {:?}", other),
        }
    }
}
