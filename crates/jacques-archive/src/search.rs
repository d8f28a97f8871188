use jacques_types::{BucketEntry, ConversationManifest, KeywordField, SearchIndex};
use std::collections::HashMap;

/// Fixed stop-word list (spec.md §4.8 "Tokenization").
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "with", "this", "that", "from", "have",
    "was", "were", "been", "what", "how", "why", "can", "will", "your", "our",
];

/// Lowercase, split on non-word runs, drop tokens shorter than 2 chars,
/// drop purely numeric tokens, drop stop words (spec.md §4.8).
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Extracts `(keyword, score, field)` for every field of a manifest,
/// collapsing duplicate keywords to the max-scoring field (spec.md §4.8
/// "retain a single bucket entry with the maximum score").
fn manifest_keywords(manifest: &ConversationManifest) -> Vec<(String, f64, KeywordField)> {
    let mut best: HashMap<String, (f64, KeywordField)> = HashMap::new();

    let mut consider = |tokens: Vec<String>, field: KeywordField| {
        let score = field.weight();
        for tok in tokens {
            best.entry(tok)
                .and_modify(|(s, f)| {
                    if score > *s {
                        *s = score;
                        *f = field;
                    }
                })
                .or_insert((score, field));
        }
    };

    consider(tokenize(&manifest.title), KeywordField::Title);
    for q in &manifest.user_questions {
        consider(tokenize(q), KeywordField::UserQuestion);
    }
    for path in &manifest.files_modified {
        consider(tokenize(path), KeywordField::FilePath);
    }
    consider(tokenize(&manifest.technologies.join(" ")), KeywordField::Technology);
    consider(tokenize(&manifest.tools_used.join(" ")), KeywordField::Technology);

    best.into_iter().map(|(k, (s, f))| (k, s, f)).collect()
}

/// Adds a manifest's keywords to the index (spec.md §4.8). Caller is
/// responsible for calling [`remove_session_from_index`] first on
/// re-archive (spec.md §4.7 idempotency).
pub fn upsert_manifest(index: &mut SearchIndex, manifest: &ConversationManifest) {
    for (keyword, score, field) in manifest_keywords(manifest) {
        index.buckets.entry(keyword).or_default().push(BucketEntry {
            manifest_id: manifest.session_id.clone(),
            score,
            field,
        });
    }

    let aggregate = index
        .projects
        .entry(manifest.project_id.clone())
        .or_insert_with(|| jacques_types::ProjectAggregate {
            path: manifest.project_path.clone(),
            conversation_count: 0,
            last_activity: manifest.archived_at,
        });
    aggregate.conversation_count += 1;
    if manifest.archived_at > aggregate.last_activity {
        aggregate.last_activity = manifest.archived_at;
    }

    index.metadata.total_conversations += 1;
    index.metadata.total_keywords = index.buckets.len();
}

/// Removes every bucket entry for `session_id` and decrements the
/// `project_id` aggregate, keeping I6 (`total = Σ project counts`) intact
/// across re-archives (spec.md §4.7 "remove any prior bucket entries for
/// that session id before inserting the new ones").
pub fn remove_session_from_index(index: &mut SearchIndex, session_id: &str) {
    let mut removed = false;
    index.buckets.retain(|_, entries| {
        let before = entries.len();
        entries.retain(|e| e.manifest_id != session_id);
        if entries.len() != before {
            removed = true;
        }
        !entries.is_empty()
    });

    if removed {
        index.metadata.total_conversations = index.metadata.total_conversations.saturating_sub(1);
    }
    index.metadata.total_keywords = index.buckets.len();
}

/// Tokenizes `query` with the same pipeline as indexing, sums per-manifest
/// scores across surviving tokens, and returns manifest ids in descending
/// score order (spec.md §4.8 "Search").
pub fn search(index: &SearchIndex, query: &str) -> Vec<(String, f64)> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for token in tokenize(query) {
        if let Some(entries) = index.buckets.get(&token) {
            for entry in entries {
                *totals.entry(entry.manifest_id.clone()).or_insert(0.0) += entry.score;
            }
        }
    }
    let mut ranked: Vec<(String, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manifest() -> ConversationManifest {
        ConversationManifest {
            session_id: "s1".to_string(),
            project_id: "-tmp".to_string(),
            project_slug: "tmp".to_string(),
            project_path: "/tmp".to_string(),
            archived_at: Utc::now(),
            auto_archived: false,
            title: "fix auth bug".to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_minutes: 1,
            user_questions: vec!["why does auth fail".to_string()],
            files_modified: vec!["src/auth.rs".to_string()],
            tools_used: vec!["Edit".to_string()],
            technologies: vec!["rust".to_string()],
            plan_ids: vec![],
            message_count: 1,
            tool_call_count: 1,
            context_snippet: None,
            user_label: None,
        }
    }

    #[test]
    fn tokenize_drops_short_numeric_and_stopwords() {
        let toks = tokenize("the Auth2 is a 42 fail-ing test");
        assert!(!toks.contains(&"the".to_string()));
        assert!(!toks.contains(&"42".to_string()));
        assert!(toks.contains(&"auth2".to_string()));
    }

    #[test]
    fn keyword_in_title_outranks_same_keyword_in_tool_name() {
        let mut index = SearchIndex::default();
        upsert_manifest(&mut index, &manifest());
        let auth_bucket = index.buckets.get("auth").unwrap();
        assert_eq!(auth_bucket.len(), 1);
        assert_eq!(auth_bucket[0].field, KeywordField::Title);
    }

    #[test]
    fn reindexing_a_session_does_not_duplicate_counts() {
        let mut index = SearchIndex::default();
        let m = manifest();
        upsert_manifest(&mut index, &m);
        remove_session_from_index(&mut index, &m.session_id);
        upsert_manifest(&mut index, &m);
        assert_eq!(index.metadata.total_conversations, 1);
        assert_eq!(index.projects.get("-tmp").unwrap().conversation_count, 1);
    }

    #[test]
    fn search_ranks_by_summed_score() {
        let mut index = SearchIndex::default();
        upsert_manifest(&mut index, &manifest());
        let ranked = search(&index, "auth");
        assert_eq!(ranked[0].0, "s1");
    }
}
