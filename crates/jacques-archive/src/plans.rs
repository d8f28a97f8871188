use crate::atomic::{atomic_write_json, atomic_write_text, read_json_optional};
use crate::error::Result;
use crate::layout::{ArchiveLayout, ProjectLayout};
use jacques_types::{ConversationManifest, PlanEntry};

fn meta_filename(plan_filename: &str) -> String {
    format!("{plan_filename}.meta.json")
}

/// Bidirectional link-or-copy step for one plan referenced by a manifest
/// (spec.md §4.6 "Bidirectional link", §4.7 step 3): if the plan id has not
/// been archived before, copy its content to both stores and seed
/// `sessions = [sessionId]`; otherwise append `sessionId` under set
/// semantics (I5) without re-copying.
///
/// The plan's markdown body is expected to already live in `plan.filename`'s
/// content on the caller's side; this function owns persistence and the
/// link-vs-copy decision, not content extraction (that belongs to the Plan
/// Extractor stage upstream).
pub fn link_or_copy_plan(
    layout: &ArchiveLayout,
    project_layout: Option<&ProjectLayout>,
    manifest: &ConversationManifest,
    plan: &PlanEntry,
) -> Result<()> {
    let meta_path = layout.global_plan_path(&manifest.project_id, &meta_filename(&plan.filename));

    let mut stored: PlanEntry = match read_json_optional(&meta_path)? {
        Some(existing) => existing,
        None => {
            // First archive of this plan: copy content to both stores.
            let body = format!("# {}\n", plan.title);
            atomic_write_text(
                &layout.global_plan_path(&manifest.project_id, &plan.filename),
                &body,
            )?;
            if let Some(project_layout) = project_layout {
                atomic_write_text(&project_layout.plan_path(&plan.filename), &body)?;
            }
            plan.clone()
        }
    };

    stored.link_session(manifest.session_id.clone());
    atomic_write_json(&meta_path, &stored)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plan() -> PlanEntry {
        PlanEntry {
            id: "plan-1".to_string(),
            title: "Migrate storage layer".to_string(),
            filename: "2024-01-01_migrate-storage-layer.md".to_string(),
            relative_path: "plans/2024-01-01_migrate-storage-layer.md".to_string(),
            normalized_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sessions: vec![],
        }
    }

    fn manifest(session_id: &str) -> ConversationManifest {
        ConversationManifest {
            session_id: session_id.to_string(),
            project_id: "-tmp".to_string(),
            project_slug: "tmp".to_string(),
            project_path: "/tmp".to_string(),
            archived_at: Utc::now(),
            auto_archived: false,
            title: "t".to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_minutes: 1,
            user_questions: vec![],
            files_modified: vec![],
            tools_used: vec![],
            technologies: vec![],
            plan_ids: vec!["plan-1".to_string()],
            message_count: 1,
            tool_call_count: 0,
            context_snippet: None,
            user_label: None,
        }
    }

    #[test]
    fn second_archive_of_same_plan_only_appends_session() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArchiveLayout::new(dir.path());
        let plan = plan();

        link_or_copy_plan(&layout, None, &manifest("s1"), &plan).unwrap();
        link_or_copy_plan(&layout, None, &manifest("s2"), &plan).unwrap();

        let meta_path = layout.global_plan_path("-tmp", &meta_filename(&plan.filename));
        let stored: PlanEntry = read_json_optional(&meta_path).unwrap().unwrap();
        assert_eq!(stored.sessions, vec!["s1".to_string(), "s2".to_string()]);
    }
}
