use chrono::{DateTime, Utc};
use jacques_types::{
    AssistantEntry, EntryPayload, ParsedEntry, ToolCallEntry, ToolResultEntry, UserEntry,
};
use std::path::Path;
use uuid::Uuid;

use super::schema::CursorRecord;

const NAMESPACE: Uuid = Uuid::from_bytes([
    0x6a, 0x61, 0x63, 0x71, 0x75, 0x65, 0x73, 0x2d, 0x63, 0x75, 0x72, 0x73, 0x6f, 0x72, 0x00, 0x00,
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

pub(crate) fn normalize_cursor_records(records: Vec<CursorRecord>) -> Vec<ParsedEntry> {
    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        let message = match &record {
            CursorRecord::User(m) | CursorRecord::Assistant(m) => m,
            CursorRecord::Unknown => continue,
        };

        let timestamp = parse_timestamp(&message.timestamp);
        let parent_id = message.parent_id.as_deref().map(parse_uuid);
        let id = parse_uuid(&message.id);

        if let Some(text) = &message.text {
            let payload = match &record {
                CursorRecord::User(_) => EntryPayload::User(UserEntry {
                    text: text.clone(),
                    internal: false,
                }),
                CursorRecord::Assistant(_) => EntryPayload::Assistant(AssistantEntry {
                    text: Some(text.clone()),
                    thinking: None,
                    recorded_output_tokens: message
                        .usage
                        .as_ref()
                        .map(|u| u.output_tokens)
                        .unwrap_or(0),
                }),
                CursorRecord::Unknown => unreachable!(),
            };
            entries.push(ParsedEntry {
                id,
                parent_id,
                timestamp,
                session_id: message.session_id.clone(),
                payload,
            });
        }

        for call in &message.tool_calls {
            let call_id = derive_uuid(&format!("{}-call-{}", message.id, call.id));
            entries.push(ParsedEntry {
                id: call_id,
                parent_id: Some(id),
                timestamp,
                session_id: message.session_id.clone(),
                payload: EntryPayload::ToolCall(ToolCallEntry {
                    tool_use_id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.args.clone(),
                }),
            });

            if let Some(result) = &call.result {
                let result_id = derive_uuid(&format!("{}-result-{}", message.id, call.id));
                entries.push(ParsedEntry {
                    id: result_id,
                    parent_id: Some(call_id),
                    timestamp,
                    session_id: message.session_id.clone(),
                    payload: EntryPayload::ToolResult(ToolResultEntry {
                        tool_result_id: call.id.clone(),
                        is_error: Some(call.is_error),
                        content: result.clone(),
                    }),
                });
            }
        }
    }

    entries
}

pub struct CursorParser;

impl crate::traits::SessionParser for CursorParser {
    fn parse_file(&self, path: &Path) -> anyhow::Result<Vec<ParsedEntry>> {
        let text = std::fs::read_to_string(path)?;
        let mut records = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            records.push(serde_json::from_str::<CursorRecord>(line)?);
        }
        Ok(normalize_cursor_records(records))
    }

    fn parse_record(&self, content: &str) -> anyhow::Result<Option<ParsedEntry>> {
        let record: CursorRecord = match serde_json::from_str(content) {
            Ok(r) => r,
            Err(_) => return Ok(None),
        };
        Ok(normalize_cursor_records(vec![record]).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::schema::CursorMessage;

    #[test]
    fn normalizes_user_message() {
        let records = vec![CursorRecord::User(CursorMessage {
            id: "m1".to_string(),
            parent_id: None,
            session_id: "s1".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            text: Some("hi".to_string()),
            tool_calls: vec![],
            usage: None,
        })];

        let entries = normalize_cursor_records(records);
        assert_eq!(entries.len(), 1);
        match &entries[0].payload {
            EntryPayload::User(u) => assert_eq!(u.text, "hi"),
            _ => panic!("expected user entry"),
        }
    }
}
