use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cursor's chat transcript record shape, thinner than the vendor CLI's
/// own format (spec.md §4.2 "a provider may supply fewer entry kinds than
/// another — unsupported kinds are simply never emitted").
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "role", rename_all = "snake_case")]
pub(crate) enum CursorRecord {
    User(CursorMessage),
    Assistant(CursorMessage),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct CursorMessage {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub session_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<CursorToolCall>,
    #[serde(default)]
    pub usage: Option<CursorUsage>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct CursorToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub(crate) struct CursorUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}
