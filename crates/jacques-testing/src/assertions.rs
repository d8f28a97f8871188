//! Custom assertions for Jacques-specific validation.

use anyhow::{Context, Result};
use jacques_types::{ConversationManifest, SearchIndex};
use serde_json::Value;

/// Assert that a `scan` command's JSON array contains a session with the
/// given session id.
pub fn assert_scan_contains_session(json: &Value, session_id: &str) -> Result<()> {
    let sessions = json.as_array().context("expected scan output to be a JSON array")?;
    let found = sessions.iter().any(|s| s["session_id"].as_str() == Some(session_id));
    if !found {
        anyhow::bail!("session {} not found in scan output: {}", session_id, json);
    }
    Ok(())
}

/// Assert that a manifest's `tools_used` contains every name in `expected`.
pub fn assert_manifest_used_tools(manifest: &ConversationManifest, expected: &[&str]) -> Result<()> {
    for tool in expected {
        if !manifest.tools_used.iter().any(|t| t == tool) {
            anyhow::bail!("expected tool {} in tools_used, got {:?}", tool, manifest.tools_used);
        }
    }
    Ok(())
}

/// Assert that a manifest records the given file among `files_modified`.
pub fn assert_manifest_modified_file(manifest: &ConversationManifest, path: &str) -> Result<()> {
    if !manifest.files_modified.iter().any(|f| f == path) {
        anyhow::bail!("expected {} in files_modified, got {:?}", path, manifest.files_modified);
    }
    Ok(())
}

/// Assert that every session id in `expected` has a manifest entry
/// somewhere in the search index's keyword buckets.
pub fn assert_index_covers_sessions(index: &SearchIndex, expected: &[&str]) -> Result<()> {
    let indexed: std::collections::HashSet<&str> = index
        .buckets
        .values()
        .flat_map(|entries| entries.iter().map(|e| e.manifest_id.as_str()))
        .collect();

    for session_id in expected {
        if !indexed.contains(session_id) {
            anyhow::bail!("session {} missing from search index buckets", session_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scan_contains_session_finds_match() {
        let json = json!([{"session_id": "sess-1"}, {"session_id": "sess-2"}]);
        assert!(assert_scan_contains_session(&json, "sess-2").is_ok());
        assert!(assert_scan_contains_session(&json, "sess-3").is_err());
    }

    #[test]
    fn manifest_tool_assertions() {
        let mut manifest = sample_manifest();
        manifest.tools_used = vec!["Read".to_string(), "Edit".to_string()];
        manifest.files_modified = vec!["/tmp/project/src/lib.rs".to_string()];

        assert!(assert_manifest_used_tools(&manifest, &["Read"]).is_ok());
        assert!(assert_manifest_used_tools(&manifest, &["Bash"]).is_err());
        assert!(assert_manifest_modified_file(&manifest, "/tmp/project/src/lib.rs").is_ok());
        assert!(assert_manifest_modified_file(&manifest, "/tmp/project/src/main.rs").is_err());
    }

    fn sample_manifest() -> ConversationManifest {
        ConversationManifest {
            session_id: "sess-1".to_string(),
            project_id: "-tmp-project".to_string(),
            project_slug: "project".to_string(),
            project_path: "/tmp/project".to_string(),
            archived_at: chrono::Utc::now(),
            auto_archived: false,
            title: "test".to_string(),
            start_time: chrono::Utc::now(),
            end_time: None,
            duration_minutes: 0,
            user_questions: Vec::new(),
            files_modified: Vec::new(),
            tools_used: Vec::new(),
            technologies: Vec::new(),
            plan_ids: Vec::new(),
            message_count: 0,
            tool_call_count: 0,
            context_snippet: None,
            user_label: None,
        }
    }
}
