use serde::{Deserialize, Serialize};

use crate::entry::SearchUrl;

/// Links a subagent-spawning `Task` tool call to later agent-progress
/// entries that reference it by `parentToolUseID` (spec.md §3, §4.4 pass 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskToolInfo {
    pub tool_use_id: String,
    pub subagent_type: String,
    pub description: String,
    pub prompt: String,
}

/// Links a `WebSearch` tool call id to the `{title,url}` pairs extracted
/// from its result, so later `search_results_received` entries sharing the
/// parent id can be annotated with sources (spec.md §3, §4.4 pass 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub tool_use_id: String,
    pub urls: Vec<SearchUrl>,
}
