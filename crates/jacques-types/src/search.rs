use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Source field a keyword's score was extracted from (spec.md §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordField {
    Title,
    UserQuestion,
    FilePath,
    Technology,
}

impl KeywordField {
    /// Field weights from spec.md §3/§4.8.
    pub fn weight(self) -> f64 {
        match self {
            KeywordField::Title => 2.0,
            KeywordField::UserQuestion => 1.5,
            KeywordField::FilePath => 1.0,
            KeywordField::Technology => 0.8,
        }
    }
}

/// One bucket entry: a manifest scored under a keyword (spec.md §3
/// "SearchIndex"). Invariant (I7): a manifest id appears at most once per
/// keyword bucket, retaining the maximum score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntry {
    pub manifest_id: String,
    pub score: f64,
    pub field: KeywordField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAggregate {
    pub path: String,
    pub conversation_count: usize,
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub total_conversations: usize,
    pub total_keywords: usize,
}

/// Global inverted keyword index for cross-project search (GLOSSARY,
/// spec.md §3 "SearchIndex").
///
/// Invariants: (I6) `metadata.total_conversations == Σ project_counts`;
/// (I7) per-keyword bucket dedup by manifest id, max score wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    pub buckets: HashMap<String, Vec<BucketEntry>>,
    pub projects: HashMap<String, ProjectAggregate>,
    pub metadata: SearchMetadata,
}
