use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk version of `ProjectIndex`. Bumped whenever the shape of
/// the unified sections changes; a loader seeing a lower version migrates
/// forward (spec.md §6 "Persisted state", §9c).
pub const PROJECT_INDEX_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextFileEntry {
    pub path: String,
    pub imported_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSessionEntry {
    pub session_id: String,
    pub manifest_path: String,
    #[serde(default)]
    pub plan_ids: Vec<String>,
    #[serde(default)]
    pub subagent_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubagentEntry {
    pub agent_id: String,
    pub agent_type: String,
    pub parent_session_id: String,
}

/// Per-project index enumerating context files, saved sessions, plans, and
/// subagent artefacts with bidirectional references (spec.md §3
/// "ProjectIndex", GLOSSARY "Project index").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIndex {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project_id: String,
    pub project_path: String,
    #[serde(default)]
    pub context: Vec<ContextFileEntry>,
    #[serde(default)]
    pub sessions: Vec<SavedSessionEntry>,
    /// Plans carry their own `sessions` field (see `PlanEntry`); this list
    /// is the set of plan ids archived against this project.
    #[serde(default)]
    pub plan_ids: Vec<String>,
    #[serde(default)]
    pub subagents: Vec<SubagentEntry>,
}

fn default_version() -> u32 {
    1
}

/// Legacy single-section shape (spec.md §3, §9c: "A legacy single-section
/// `files` variant must be migrated on load into the unified shape").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyProjectIndex {
    pub project_id: String,
    pub project_path: String,
    #[serde(default)]
    pub files: Vec<ContextFileEntry>,
}

impl ProjectIndex {
    /// Lossless migration of the legacy `files[]` shape into the unified
    /// sections (spec.md §9c "migration is forward-only").
    pub fn migrate_legacy(legacy: LegacyProjectIndex) -> Self {
        Self {
            version: PROJECT_INDEX_VERSION,
            project_id: legacy.project_id,
            project_path: legacy.project_path,
            context: legacy.files,
            sessions: Vec::new(),
            plan_ids: Vec::new(),
            subagents: Vec::new(),
        }
    }

    pub fn new(project_id: impl Into<String>, project_path: impl Into<String>) -> Self {
        Self {
            version: PROJECT_INDEX_VERSION,
            project_id: project_id.into(),
            project_path: project_path.into(),
            context: Vec::new(),
            sessions: Vec::new(),
            plan_ids: Vec::new(),
            subagents: Vec::new(),
        }
    }

    pub fn needs_migration(&self) -> bool {
        self.version < PROJECT_INDEX_VERSION
    }
}
