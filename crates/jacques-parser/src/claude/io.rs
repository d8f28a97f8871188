use crate::Result;
use jacques_types::ParsedEntry;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::parser::normalize_claude_records;
use super::schema::ClaudeRecord;

/// Parse a vendor JSONL file into its normalized entry stream.
pub fn normalize_claude_file(path: &Path) -> Result<Vec<ParsedEntry>> {
    let text = std::fs::read_to_string(path)?;

    let mut records: Vec<ClaudeRecord> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ClaudeRecord = serde_json::from_str(line)?;
        records.push(record);
    }

    Ok(normalize_claude_records(records))
}

#[derive(Debug)]
pub struct ClaudeHeader {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub timestamp: Option<String>,
    pub snippet: Option<String>,
    pub is_sidechain: bool,
}

/// Extract header information from a vendor file for scanning, without a
/// full parse (spec.md §4.2 "resolve_log_root"/"scan_sessions").
pub fn extract_claude_header(path: &Path) -> Result<ClaudeHeader> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut session_id = None;
    let mut cwd = None;
    let mut timestamp = None;
    let mut snippet = None;
    let mut is_sidechain = false;
    let mut meta_message_ids = std::collections::HashSet::new();

    for line in reader.lines().take(200).flatten() {
        if let Ok(record) = serde_json::from_str::<ClaudeRecord>(&line) {
            match &record {
                ClaudeRecord::FileHistorySnapshot(_) => {
                    meta_message_ids.clear();
                }
                ClaudeRecord::User(user) => {
                    if session_id.is_none() {
                        session_id = Some(user.session_id.clone());
                    }
                    if cwd.is_none() {
                        cwd = user.cwd.clone();
                    }
                    if timestamp.is_none() {
                        timestamp = Some(user.timestamp.clone());
                    }

                    if user.is_meta {
                        meta_message_ids.insert(user.uuid.clone());
                    }

                    let parent_is_meta = user
                        .parent_uuid
                        .as_ref()
                        .map(|p| meta_message_ids.contains(p))
                        .unwrap_or(false);

                    if parent_is_meta {
                        meta_message_ids.insert(user.uuid.clone());
                    }

                    if snippet.is_none() && !user.is_sidechain && !user.is_meta && !parent_is_meta {
                        snippet = user.message.content.iter().find_map(|c| match c {
                            super::schema::UserContent::Text { text } => Some(text.clone()),
                            _ => None,
                        });
                    }
                    is_sidechain = user.is_sidechain;
                }
                ClaudeRecord::Assistant(asst) => {
                    if session_id.is_none() {
                        session_id = Some(asst.session_id.clone());
                    }
                    if cwd.is_none() {
                        cwd = asst.cwd.clone();
                    }
                    if timestamp.is_none() {
                        timestamp = Some(asst.timestamp.clone());
                    }
                }
                _ => {}
            }

            if session_id.is_some() && cwd.is_some() && timestamp.is_some() && snippet.is_some() {
                break;
            }
        }
    }

    Ok(ClaudeHeader {
        session_id,
        cwd,
        timestamp,
        snippet,
        is_sidechain,
    })
}
