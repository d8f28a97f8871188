use chrono::{DateTime, Utc};
use jacques_types::{EntryPayload, ParsedEntry};
use once_cell::sync::Lazy;
use regex::Regex;

/// A rule-based project-state summary extracted from a transcript
/// (spec.md §4.9 "Handoff Generator").
#[derive(Debug, Clone)]
pub struct Handoff {
    pub title: String,
    pub files_modified: Vec<String>,
    pub tools_used: Vec<String>,
    pub recent_user_messages: Vec<String>,
    pub assistant_highlights: Vec<String>,
    pub decisions: Vec<String>,
    pub blockers: Vec<String>,
    pub technologies: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

static DECISION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(let'?s|we('ll| will)|i('ll| will)|decided to|going with)\b").unwrap()
});
static BLOCKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(blocked|stuck|failing|can'?t figure out|not sure how|error:)\b").unwrap()
});
static TECH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(rust|python|typescript|javascript|react|postgres|sqlite|docker|kubernetes|redis|graphql|grpc)\b").unwrap()
});

fn matches(re: &Regex, text: &str) -> bool {
    re.is_match(text)
}

/// Builds a [`Handoff`] from a session's normalized entry stream
/// (spec.md §4.9 contract). `recent_limit` is 5 for the markdown output,
/// 10 for the skill-context string.
pub fn build_handoff(entries: &[ParsedEntry], recent_limit: usize) -> Handoff {
    let mut files_modified = Vec::new();
    let mut tools_used = Vec::new();
    let mut user_messages = Vec::new();
    let mut assistant_messages = Vec::new();
    let mut decisions = Vec::new();
    let mut blockers = Vec::new();
    let mut tech_text = String::new();

    for entry in entries {
        match &entry.payload {
            EntryPayload::ToolCall(call) => {
                if !tools_used.contains(&call.name) {
                    tools_used.push(call.name.clone());
                }
                if matches!(call.name.as_str(), "Write" | "Edit" | "NotebookEdit")
                    && let Some(path) = call.input.get("file_path").and_then(|v| v.as_str())
                    && !files_modified.contains(&path.to_string())
                {
                    files_modified.push(path.to_string());
                }
            }
            EntryPayload::User(user) if !user.internal => {
                user_messages.push(user.text.clone());
                if matches(&DECISION_RE, &user.text) {
                    decisions.push(user.text.clone());
                }
                if matches(&BLOCKER_RE, &user.text) {
                    blockers.push(user.text.clone());
                }
                tech_text.push(' ');
                tech_text.push_str(&user.text);
            }
            EntryPayload::Assistant(asst) => {
                if let Some(text) = &asst.text {
                    assistant_messages.push(text.clone());
                    if matches(&BLOCKER_RE, text) {
                        blockers.push(text.clone());
                    }
                    tech_text.push(' ');
                    tech_text.push_str(text);
                }
            }
            _ => {}
        }
    }

    tools_used.sort();

    let technologies: Vec<String> = TECH_RE
        .find_iter(&tech_text)
        .map(|m| m.as_str().to_lowercase())
        .chain(files_modified.iter().filter_map(|f| {
            std::path::Path::new(f)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
        }))
        .fold(Vec::new(), |mut acc, tech| {
            if !acc.contains(&tech) {
                acc.push(tech);
            }
            acc
        });

    let title = user_messages
        .first()
        .map(|s| s.chars().take(80).collect())
        .unwrap_or_else(|| "Untitled session".to_string());

    let tail = |v: &[String], n: usize| -> Vec<String> {
        v.iter().rev().take(n).rev().cloned().collect()
    };

    Handoff {
        title,
        files_modified,
        tools_used,
        recent_user_messages: tail(&user_messages, recent_limit),
        assistant_highlights: tail(&assistant_messages, 5),
        decisions,
        blockers,
        technologies,
        generated_at: Utc::now(),
    }
}

/// `⌈content.length / 4.5⌉` token estimate (spec.md §4.9).
pub fn estimate_markdown_tokens(content: &str) -> u64 {
    ((content.len() as f64) / 4.5).ceil() as u64
}

/// Composes the ~1,000-token markdown document (spec.md §4.9).
pub fn render_markdown(handoff: &Handoff) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Handoff: {}\n\n", handoff.title));
    out.push_str(&format!("Generated: {}\n\n", handoff.generated_at.to_rfc3339()));

    if !handoff.files_modified.is_empty() {
        out.push_str("## Files Modified\n");
        for f in &handoff.files_modified {
            out.push_str(&format!("- {f}\n"));
        }
        out.push('\n');
    }

    if !handoff.tools_used.is_empty() {
        out.push_str(&format!("## Tools Used\n{}\n\n", handoff.tools_used.join(", ")));
    }

    if !handoff.decisions.is_empty() {
        out.push_str("## Decisions\n");
        for d in &handoff.decisions {
            out.push_str(&format!("- {d}\n"));
        }
        out.push('\n');
    }

    if !handoff.blockers.is_empty() {
        out.push_str("## Blockers\n");
        for b in &handoff.blockers {
            out.push_str(&format!("- {b}\n"));
        }
        out.push('\n');
    }

    if !handoff.technologies.is_empty() {
        out.push_str(&format!("## Technologies\n{}\n\n", handoff.technologies.join(", ")));
    }

    if !handoff.recent_user_messages.is_empty() {
        out.push_str("## Recent Messages\n");
        for m in &handoff.recent_user_messages {
            out.push_str(&format!("- {m}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacques_types::{ToolCallEntry, UserEntry};
    use uuid::Uuid;

    fn user(text: &str) -> ParsedEntry {
        ParsedEntry {
            id: Uuid::new_v4(),
            parent_id: None,
            timestamp: Utc::now(),
            session_id: "s1".to_string(),
            payload: EntryPayload::User(UserEntry { text: text.to_string(), internal: false }),
        }
    }

    #[test]
    fn detects_blockers_and_decisions() {
        let entries = vec![
            user("I'm stuck on this auth error, can't figure out why it fails"),
            user("let's use rust and postgres for the next phase"),
        ];
        let handoff = build_handoff(&entries, 5);
        assert_eq!(handoff.blockers.len(), 1);
        assert_eq!(handoff.decisions.len(), 1);
        assert!(handoff.technologies.contains(&"rust".to_string()));
        assert!(handoff.technologies.contains(&"postgres".to_string()));
    }

    #[test]
    fn collects_files_modified_from_write_edit_tool_calls() {
        let entries = vec![ParsedEntry {
            id: Uuid::new_v4(),
            parent_id: None,
            timestamp: Utc::now(),
            session_id: "s1".to_string(),
            payload: EntryPayload::ToolCall(ToolCallEntry {
                tool_use_id: "t1".to_string(),
                name: "Edit".to_string(),
                input: serde_json::json!({"file_path": "src/main.rs"}),
            }),
        }];
        let handoff = build_handoff(&entries, 5);
        assert_eq!(handoff.files_modified, vec!["src/main.rs".to_string()]);
    }

    #[test]
    fn token_estimate_matches_ceiling_rule() {
        assert_eq!(estimate_markdown_tokens(""), 0);
        assert_eq!(estimate_markdown_tokens("123456789"), 2);
    }
}
