use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model_limits::DEFAULT_CONTEXT_WINDOW;

/// Provider-agnostic source tag for a session (I1: session identifiers are
/// unique within the registry, enforced by the registry, not this type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    ClaudeCode,
    Cursor,
    #[serde(other)]
    Unknown,
}

impl Source {
    /// Collapses the vendor's distinct `source` strings (`clear`, `startup`,
    /// `resume`) to the single `claude_code` tag (spec.md §4.2).
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "clear" | "startup" | "resume" | "claude_code" | "claude-code" => Source::ClaudeCode,
            "cursor" => Source::Cursor,
            _ => Source::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Working,
    Idle,
}

/// Model descriptor reported by `session_start` (spec.md §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    pub display_name: Option<String>,
    pub id: Option<String>,
}

/// A stable string identifying the host terminal session (GLOSSARY), derived
/// from a priority list of environment variables or a controlling TTY, and
/// tagged with the source it came from (e.g. `ITERM:`, `TTY:`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminalKey(pub String);

impl TerminalKey {
    pub fn unknown() -> Self {
        Self("UNKNOWN:".to_string())
    }
}

/// Live context-window utilization for a session (spec.md §3).
///
/// Invariants: `0 <= used_percentage <= 100`; `used_percentage +
/// remaining_percentage == 100`; an `is_estimate = false` value originated
/// from a first-party pre-compact event and overrides any prior estimate
/// but is never overridden by a later estimate (spec.md lifecycle rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMetrics {
    pub used_percentage: f64,
    pub remaining_percentage: f64,
    pub context_window_size: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_creation_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u64>,
    pub is_estimate: bool,
    /// Upstream's auto-compact bug surfaced for UIs (spec.md §9b); the
    /// server itself never acts on this field.
    pub bug_threshold: f64,
}

impl ContextMetrics {
    pub fn new(
        used_percentage: f64,
        context_window_size: u64,
        total_input_tokens: u64,
        total_output_tokens: u64,
        is_estimate: bool,
    ) -> Self {
        let used_percentage = used_percentage.clamp(0.0, 100.0);
        Self {
            used_percentage,
            remaining_percentage: 100.0 - used_percentage,
            context_window_size,
            total_input_tokens,
            total_output_tokens,
            cache_creation_tokens: None,
            cache_read_tokens: None,
            is_estimate,
            bug_threshold: crate::model_limits::BUG_AUTOCOMPACT_THRESHOLD_PCT,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, DEFAULT_CONTEXT_WINDOW, 0, 0, true)
    }

    /// Apply the lifecycle rule from spec.md §3: a non-estimate value
    /// replaces an estimate, but an estimate never replaces a non-estimate.
    pub fn apply_update(&mut self, next: ContextMetrics) {
        if self.is_estimate || !next.is_estimate {
            *self = next;
        }
    }
}

/// One in-progress conversation with a vendor CLI instance (GLOSSARY).
///
/// Invariants (enforced by the owning registry, not by this type alone):
/// (I1) identifiers unique within the registry; (I2) at most one focused
/// session at a time; (I3) `last_activity` is monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub source: Source,
    pub project_path: Option<String>,
    pub working_directory: Option<String>,
    pub project_display_name: Option<String>,
    pub terminal_key: TerminalKey,
    pub model: ModelInfo,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub autocompact_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_metrics: Option<ContextMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Session {
    /// Minimal-default session for auto-registration on an out-of-order
    /// `context_update` (spec.md §4.1 "Auto-registration").
    pub fn minimal(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            source: Source::Unknown,
            project_path: None,
            working_directory: None,
            project_display_name: None,
            terminal_key: TerminalKey::unknown(),
            model: ModelInfo::default(),
            status: SessionStatus::Active,
            created_at: now,
            last_activity: now,
            autocompact_enabled: true,
            context_metrics: None,
            transcript_path: None,
            git_branch: None,
            title: None,
        }
    }

    /// Merge metadata from a late `registerSession` into an
    /// auto-registered session without regressing any field already set to
    /// a non-default value (spec.md §4.1).
    pub fn merge_registration(&mut self, meta: Session) {
        if matches!(self.source, Source::Unknown) {
            self.source = meta.source;
        }
        if self.project_path.is_none() {
            self.project_path = meta.project_path;
        }
        if self.working_directory.is_none() {
            self.working_directory = meta.working_directory;
        }
        if self.project_display_name.is_none() {
            self.project_display_name = meta.project_display_name;
        }
        if self.terminal_key.0.starts_with("UNKNOWN:") {
            self.terminal_key = meta.terminal_key;
        }
        if self.model.display_name.is_none() {
            self.model.display_name = meta.model.display_name;
        }
        if self.model.id.is_none() {
            self.model.id = meta.model.id;
        }
        if self.transcript_path.is_none() {
            self.transcript_path = meta.transcript_path;
        }
        if self.created_at > meta.created_at {
            self.created_at = meta.created_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_never_overrides_non_estimate() {
        let mut m = ContextMetrics::new(25.0, 200_000, 36_000, 0, false);
        let before = m.used_percentage;
        m.apply_update(ContextMetrics::new(25.0, 200_000, 36_000, 0, true));
        assert_eq!(m.used_percentage, before);
        assert!(!m.is_estimate);
    }

    #[test]
    fn non_estimate_overrides_estimate() {
        let mut m = ContextMetrics::new(25.0, 200_000, 36_000, 0, true);
        m.apply_update(ContextMetrics::new(23.7, 200_000, 36_000, 0, false));
        assert_eq!(m.used_percentage, 23.7);
        assert!(!m.is_estimate);
    }

    #[test]
    fn percentages_sum_to_100() {
        let m = ContextMetrics::new(18.0, 200_000, 36_000, 0, true);
        assert_eq!(m.used_percentage + m.remaining_percentage, 100.0);
    }

    #[test]
    fn source_normalizes_claude_variants() {
        assert_eq!(Source::normalize("clear"), Source::ClaudeCode);
        assert_eq!(Source::normalize("startup"), Source::ClaudeCode);
        assert_eq!(Source::normalize("resume"), Source::ClaudeCode);
        assert_eq!(Source::normalize("cursor"), Source::Cursor);
    }

    #[test]
    fn merge_registration_does_not_regress_set_fields() {
        let mut s = Session::minimal("s1", Utc::now());
        s.project_path = Some("/already/set".to_string());

        let mut incoming = Session::minimal("s1", Utc::now());
        incoming.project_path = Some("/should/not/apply".to_string());
        incoming.working_directory = Some("/p".to_string());

        s.merge_registration(incoming);
        assert_eq!(s.project_path.as_deref(), Some("/already/set"));
        assert_eq!(s.working_directory.as_deref(), Some("/p"));
    }
}
