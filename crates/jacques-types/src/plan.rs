use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An embedded plan extracted from a user message (GLOSSARY,
/// spec.md §3 "PlanEntry").
///
/// Invariants: (I4) `id` is stable across runs for the same originating
/// plan path; (I5) `sessions` is a set under id equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub relative_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sessions: Vec<String>,
}

impl PlanEntry {
    /// Adds `session_id` to `sessions` under set semantics (I5).
    pub fn link_session(&mut self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        if !self.sessions.contains(&session_id) {
            self.sessions.push(session_id);
        }
    }
}
