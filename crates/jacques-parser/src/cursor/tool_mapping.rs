use crate::traits::ToolKind;
use serde_json::Value;

pub struct CursorToolMapper;

impl crate::traits::ToolMapper for CursorToolMapper {
    fn classify(&self, tool_name: &str) -> ToolKind {
        match tool_name {
            "read_file" => ToolKind::Read,
            "write_file" | "edit_file" => ToolKind::Write,
            "run_terminal_cmd" => ToolKind::Execute,
            "codebase_search" | "grep_search" | "file_search" => ToolKind::Search,
            _ => ToolKind::Other,
        }
    }

    fn summarize(&self, tool_name: &str, args: &Value) -> Option<String> {
        match tool_name {
            "read_file" | "write_file" | "edit_file" => args
                .get("target_file")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            "run_terminal_cmd" => args
                .get("command")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            _ => None,
        }
    }
}
