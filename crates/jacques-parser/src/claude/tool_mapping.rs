use crate::traits::ToolKind;
use serde_json::Value;

/// Classify a Claude Code tool name by coarse kind for display purposes
/// (spec.md §4.9 "toolsUsed").
pub fn classify_tool(tool_name: &str) -> ToolKind {
    match tool_name {
        "AskUserQuestion" => ToolKind::Ask,
        "Bash" | "KillShell" | "BashOutput" | "Skill" | "SlashCommand" => ToolKind::Execute,
        "Edit" | "Write" | "NotebookEdit" => ToolKind::Write,
        "Read" => ToolKind::Read,
        "Glob" | "Grep" | "WebFetch" | "WebSearch" => ToolKind::Search,
        "Task" | "TodoWrite" | "ExitPlanMode" => ToolKind::Plan,
        _ => ToolKind::Other,
    }
}

/// Extract a short human summary of a tool call's arguments, mirroring
/// what the vendor CLI's own terminal UI shows.
pub fn extract_summary(tool_name: &str, arguments: &Value) -> Option<String> {
    match tool_name {
        "AskUserQuestion" => arguments
            .get("questions")
            .and_then(|q| q.as_array())
            .and_then(|arr| arr.first())
            .and_then(|item| item.get("header"))
            .and_then(|h| h.as_str())
            .map(|s| s.to_string()),
        "TodoWrite" => extract_todo_summary(arguments),
        "BashOutput" => arguments
            .get("bash_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        "Read" | "Edit" | "Write" => arguments
            .get("file_path")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        "Bash" => arguments
            .get("command")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

fn extract_todo_summary(args: &Value) -> Option<String> {
    let todos = args.get("todos")?.as_array()?;
    let count = todos.len();
    let first = todos.first()?;
    let text = first.get("content")?.as_str()?;

    if count > 1 {
        Some(format!("{} (+{} more)", text, count - 1))
    } else {
        Some(text.to_string())
    }
}

pub struct ClaudeToolMapper;

impl crate::traits::ToolMapper for ClaudeToolMapper {
    fn classify(&self, tool_name: &str) -> ToolKind {
        classify_tool(tool_name)
    }

    fn summarize(&self, tool_name: &str, args: &Value) -> Option<String> {
        extract_summary(tool_name, args)
    }
}
