use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;
use crate::layout::{ArchiveLayout, ProjectLayout, conversation_filename};
use crate::plans::link_or_copy_plan;
use crate::search::{remove_session_from_index, upsert_manifest};
use jacques_core::project_slug;
use jacques_types::{ConversationManifest, ParsedEntry, PlanEntry, ProjectIndex, SavedSessionEntry};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Archive Store: per-project + global on-disk layout for manifests,
/// conversations, plans, and the unified search index (spec.md §4.7).
///
/// Write access to a given `projectId` is serialized through a lock-striping
/// table, the same shape as the teacher's session-dedup
/// `Arc<Mutex<HashSet<_>>>` (spec.md §5 "Shared-resource policy").
pub struct ArchiveStore {
    layout: ArchiveLayout,
    project_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ArchiveStore {
    pub fn new(global_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            layout: ArchiveLayout::new(global_root),
            project_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_for(&self, project_id: &str) -> Arc<Mutex<()>> {
        let mut table = self.project_locks.lock().unwrap();
        table
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Runs the four-step archive flow from spec.md §4.7. Idempotent:
    /// re-archiving the same `session_id` overwrites the manifest and
    /// conversation and replaces (rather than duplicates) the search-index
    /// bucket entries for that session.
    pub fn archive_conversation(
        &self,
        manifest: ConversationManifest,
        entries: &[ParsedEntry],
        plans: &[PlanEntry],
        project_root: Option<&Path>,
        opt_out_per_project: bool,
    ) -> Result<()> {
        let project_lock = self.lock_for(&manifest.project_id);
        let _guard = project_lock.lock().unwrap();

        // (1) manifest, global.
        atomic_write_json(&self.layout.manifest_path(&manifest.session_id), &manifest)?;

        // (2) full conversation, global + (unless opted out) per-project.
        let slug = project_slug(&manifest.title);
        let filename = conversation_filename(manifest.archived_at, &slug, &manifest.session_id);
        atomic_write_json(
            &self.layout.global_conversation_path(&manifest.project_id, &filename),
            &entries,
        )?;

        let project_layout = project_root.map(ProjectLayout::new);
        if !opt_out_per_project
            && let Some(project_layout) = &project_layout
        {
            atomic_write_json(&project_layout.conversation_path(&filename), &entries)?;
        }

        // (3) link-or-copy each referenced plan.
        for plan in plans {
            link_or_copy_plan(&self.layout, project_layout.as_ref(), &manifest, plan)?;
        }

        // (4) update the global search index, staged then swapped in so a
        // mid-update failure never leaves a stale/partial index on disk.
        let mut index = read_json_optional(&self.layout.index_path())?.unwrap_or_default();
        remove_session_from_index(&mut index, &manifest.session_id);
        upsert_manifest(&mut index, &manifest);
        atomic_write_json(&self.layout.index_path(), &index)?;

        // Unified per-project index: record this session (I4/I5 plan set
        // semantics are enforced inside `link_or_copy_plan`).
        if let Some(project_layout) = &project_layout {
            let mut project_index = read_json_optional(&project_layout.index_path())?
                .unwrap_or_else(|| ProjectIndex::new(manifest.project_id.clone(), manifest.project_path.clone()));
            project_index.sessions.retain(|s| s.session_id != manifest.session_id);
            project_index.sessions.push(SavedSessionEntry {
                session_id: manifest.session_id.clone(),
                manifest_path: self.layout.manifest_path(&manifest.session_id).to_string_lossy().into_owned(),
                plan_ids: manifest.plan_ids.clone(),
                subagent_ids: Vec::new(),
            });
            for plan_id in &manifest.plan_ids {
                if !project_index.plan_ids.contains(plan_id) {
                    project_index.plan_ids.push(plan_id.clone());
                }
            }
            atomic_write_json(&project_layout.index_path(), &project_index)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manifest(session_id: &str) -> ConversationManifest {
        ConversationManifest {
            session_id: session_id.to_string(),
            project_id: "-tmp-proj".to_string(),
            project_slug: "proj".to_string(),
            project_path: "/tmp/proj".to_string(),
            archived_at: Utc::now(),
            auto_archived: false,
            title: "fix the parser".to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_minutes: 5,
            user_questions: vec!["why is this failing".to_string()],
            files_modified: vec!["src/lib.rs".to_string()],
            tools_used: vec!["Edit".to_string()],
            technologies: vec!["rust".to_string()],
            plan_ids: vec![],
            message_count: 2,
            tool_call_count: 1,
            context_snippet: None,
            user_label: None,
        }
    }

    #[test]
    fn archiving_is_idempotent_on_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArchiveStore::new(dir.path());
        let m = manifest("sess-1");

        store.archive_conversation(m.clone(), &[], &[], None, true).unwrap();
        store.archive_conversation(m, &[], &[], None, true).unwrap();

        let index: jacques_types::SearchIndex =
            read_json_optional(&store.layout.index_path()).unwrap().unwrap();
        let bucket = index.buckets.get("fix").unwrap();
        assert_eq!(bucket.iter().filter(|e| e.manifest_id == "sess-1").count(), 1);
    }
}
