//! Synthetic transcript generation for integration tests.
//!
//! Builds vendor-shaped JSONL records in memory (the wire format
//! `jacques-parser`'s Claude adapter reads, spec.md §4.4) instead of
//! shipping static sample files, so a fixture's session id, cwd, and
//! tool calls are always consistent with the test that built it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Value};

/// Builds a single Claude Code transcript file line by line.
///
/// # Example
/// ```no_run
/// use jacques_testing::fixtures::ClaudeTranscriptBuilder;
///
/// let lines = ClaudeTranscriptBuilder::new("sess-1", "/tmp/project")
///     .user_message("fix the bug")
///     .assistant_text("looking into it")
///     .tool_call("call-1", "Read", serde_json::json!({"file_path": "/tmp/project/src/lib.rs"}))
///     .tool_result("call-1", serde_json::json!("fn main() {}"), false)
///     .build();
/// assert_eq!(lines.len(), 4);
/// ```
pub struct ClaudeTranscriptBuilder {
    session_id: String,
    cwd: String,
    seq: u32,
    lines: Vec<Value>,
}

impl ClaudeTranscriptBuilder {
    pub fn new(session_id: impl Into<String>, cwd: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), cwd: cwd.into(), seq: 0, lines: Vec::new() }
    }

    fn uuid(&mut self) -> String {
        self.seq += 1;
        format!("00000000-0000-0000-0000-{:012x}", self.seq)
    }

    fn timestamp(&self) -> String {
        format!("2025-01-01T00:00:{:02}Z", self.seq.min(59))
    }

    pub fn user_message(mut self, text: &str) -> Self {
        let uuid = self.uuid();
        let timestamp = self.timestamp();
        self.lines.push(json!({
            "type": "user",
            "uuid": uuid,
            "sessionId": self.session_id,
            "timestamp": timestamp,
            "cwd": self.cwd,
            "isSidechain": false,
            "isMeta": false,
            "message": {"role": "user", "content": text},
        }));
        self
    }

    pub fn assistant_text(mut self, text: &str) -> Self {
        let uuid = self.uuid();
        let timestamp = self.timestamp();
        self.lines.push(json!({
            "type": "assistant",
            "uuid": uuid,
            "sessionId": self.session_id,
            "timestamp": timestamp,
            "cwd": self.cwd,
            "isSidechain": false,
            "message": {
                "type": "message",
                "id": uuid,
                "role": "assistant",
                "model": "claude-test",
                "content": [{"type": "text", "text": text}],
                "usage": {"input_tokens": 10, "output_tokens": 20},
            },
        }));
        self
    }

    pub fn tool_call(mut self, tool_use_id: &str, name: &str, input: Value) -> Self {
        let uuid = self.uuid();
        let timestamp = self.timestamp();
        self.lines.push(json!({
            "type": "assistant",
            "uuid": uuid,
            "sessionId": self.session_id,
            "timestamp": timestamp,
            "cwd": self.cwd,
            "isSidechain": false,
            "message": {
                "type": "message",
                "id": uuid,
                "role": "assistant",
                "model": "claude-test",
                "content": [{"type": "tool_use", "id": tool_use_id, "name": name, "input": input}],
                "usage": {"input_tokens": 10, "output_tokens": 5},
            },
        }));
        self
    }

    pub fn tool_result(mut self, tool_use_id: &str, content: Value, is_error: bool) -> Self {
        let uuid = self.uuid();
        let timestamp = self.timestamp();
        self.lines.push(json!({
            "type": "user",
            "uuid": uuid,
            "sessionId": self.session_id,
            "timestamp": timestamp,
            "cwd": self.cwd,
            "isSidechain": false,
            "isMeta": false,
            "message": {
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": tool_use_id,
                    "content": content,
                    "is_error": is_error,
                }],
            },
        }));
        self
    }

    /// Adds a Task tool-result carrying the spawned sidechain's `agentId`,
    /// the correlation the vendor CLI uses to link a sidechain session
    /// back to the turn/step that spawned it.
    pub fn task_spawn_result(self, tool_use_id: &str, agent_id: &str) -> Self {
        self.tool_result(tool_use_id, json!({"agentId": agent_id, "status": "completed"}), false)
    }

    pub fn build(self) -> Vec<Value> {
        self.lines
    }

    pub fn to_jsonl(self) -> String {
        self.lines.into_iter().map(|v| v.to_string()).collect::<Vec<_>>().join("\n") + "\n"
    }

    /// Writes the built transcript to `path`, creating parent directories
    /// as needed.
    pub fn write_to(self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_jsonl())?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_one_line_per_entry() {
        let lines = ClaudeTranscriptBuilder::new("sess-1", "/tmp/project")
            .user_message("hello")
            .assistant_text("hi")
            .build();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "user");
        assert_eq!(lines[1]["type"], "assistant");
    }

    #[test]
    fn task_spawn_result_embeds_agent_id() {
        let lines = ClaudeTranscriptBuilder::new("sess-1", "/tmp/project")
            .tool_call("call-1", "Task", json!({"description": "explore"}))
            .task_spawn_result("call-1", "sub-1")
            .build();
        let content = &lines[1]["message"]["content"][0]["content"];
        assert_eq!(content["agentId"], "sub-1");
    }
}
