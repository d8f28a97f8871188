use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// On-disk archive layout rooted at the global workspace path
/// (`jacques_core::resolve_workspace_path`), plus the per-project mirror
/// under `<project-root>/.jacques`.
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    pub global_root: PathBuf,
}

impl ArchiveLayout {
    pub fn new(global_root: impl Into<PathBuf>) -> Self {
        Self {
            global_root: global_root.into(),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.global_root.join("archive").join("index.json")
    }

    pub fn manifest_path(&self, session_id: &str) -> PathBuf {
        self.global_root
            .join("archive")
            .join("manifests")
            .join(format!("{session_id}.json"))
    }

    pub fn global_conversation_path(&self, project_id: &str, filename: &str) -> PathBuf {
        self.global_root
            .join("archive")
            .join("conversations")
            .join(project_id)
            .join(filename)
    }

    pub fn global_plan_path(&self, project_id: &str, filename: &str) -> PathBuf {
        self.global_root
            .join("archive")
            .join("plans")
            .join(project_id)
            .join(filename)
    }

    pub fn global_context_dir(&self, project_id: &str) -> PathBuf {
        self.global_root.join("archive").join("context").join(project_id)
    }
}

/// Per-project mirror of the global archive, rooted at `<project-root>/.jacques`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dot_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_dot_dir: project_root.join(".jacques"),
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.project_dot_dir.join("index.json")
    }

    pub fn local_search_index_path(&self) -> PathBuf {
        self.project_dot_dir.join("sessions").join("index.json")
    }

    pub fn conversation_path(&self, filename: &str) -> PathBuf {
        self.project_dot_dir.join("sessions").join(filename)
    }

    pub fn plan_path(&self, filename: &str) -> PathBuf {
        self.project_dot_dir.join("plans").join(filename)
    }

    pub fn context_path(&self, filename: &str) -> PathBuf {
        self.project_dot_dir.join("context").join(filename)
    }

    pub fn handoff_path(&self, timestamp: DateTime<Utc>) -> PathBuf {
        self.project_dot_dir
            .join("handoffs")
            .join(format!("{}-handoff.md", timestamp.to_rfc3339()))
    }
}

/// `<yyyy-mm-dd>_<hh-mm>_<title-slug>_<id4>.json` (spec.md §4.7).
pub fn conversation_filename(when: DateTime<Utc>, title_slug: &str, session_id: &str) -> String {
    let id4: String = session_id.chars().filter(|c| c.is_ascii_alphanumeric()).take(4).collect();
    format!(
        "{}_{}_{}_{}.json",
        when.format("%Y-%m-%d"),
        when.format("%H-%M"),
        title_slug,
        id4
    )
}

/// `<yyyy-mm-dd>_<title-slug>.md` (spec.md §4.7).
pub fn plan_filename(when: DateTime<Utc>, title_slug: &str) -> String {
    format!("{}_{}.md", when.format("%Y-%m-%d"), title_slug)
}
