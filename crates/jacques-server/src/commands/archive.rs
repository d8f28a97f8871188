use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use jacques_archive::ArchiveStore;
use jacques_core::project_slug;
use jacques_engine::assemble_session;
use jacques_parser::{create_all_adapters, detect_adapter_from_path};
use jacques_types::{ConversationManifest, ParsedEntry};

use crate::cli::{ArchiveArgs, Cli};

const FILE_MODIFYING_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit", "NotebookEdit"];

pub fn run(cli: &Cli, args: ArchiveArgs) -> Result<()> {
    let entries = load_transcript(&args)?;
    if entries.is_empty() {
        anyhow::bail!("no transcript entries found for session {}", args.session_id);
    }

    let session = assemble_session(&entries)
        .with_context(|| format!("session {} produced no turns", args.session_id))?;

    let project_root = args
        .project_root
        .map(PathBuf::from)
        .unwrap_or(std::env::current_dir()?);
    let project_path = project_root.to_string_lossy().into_owned();
    let project_id = jacques_core::encode_project_id(&project_path);

    let manifest = build_manifest(&args.session_id, &project_id, &project_path, &session, &entries);

    let root = super::workspace_root(cli)?;
    let store = ArchiveStore::new(root);
    store.archive_conversation(manifest, &entries, &[], Some(&project_root), false)?;

    println!("archived session {}", args.session_id);
    Ok(())
}

fn load_transcript(args: &ArchiveArgs) -> Result<Vec<ParsedEntry>> {
    let Some(transcript) = &args.transcript else {
        anyhow::bail!("--transcript is required until live registry lookup is wired in");
    };
    let path = PathBuf::from(transcript);
    let adapter =
        detect_adapter_from_path(transcript).unwrap_or_else(|_| create_all_adapters().remove(0));
    adapter.parser.parse_file(&path).context("failed to parse transcript")
}

fn build_manifest(
    session_id: &str,
    project_id: &str,
    project_path: &str,
    session: &jacques_engine::AgentSession,
    entries: &[ParsedEntry],
) -> ConversationManifest {
    let title = session
        .turns
        .first()
        .map(|t| t.user.content.text.chars().take(80).collect())
        .unwrap_or_else(|| "untitled session".to_string());

    let user_questions = session
        .turns
        .iter()
        .filter(|t| !t.user.content.internal)
        .map(|t| t.user.content.text.clone())
        .collect();

    let tool_calls: Vec<_> = session.turns.iter().flat_map(|t| &t.steps).flat_map(|s| &s.tools).collect();
    let tool_call_count = tool_calls.len();

    let mut tools_used = BTreeSet::new();
    let mut files_modified = BTreeSet::new();
    for execution in &tool_calls {
        let name = &execution.call.content.name;
        tools_used.insert(name.clone());
        if FILE_MODIFYING_TOOLS.contains(&name.as_str()) {
            if let Some(path) = execution.call.content.input.get("file_path").and_then(|v| v.as_str()) {
                files_modified.insert(path.to_string());
            }
        }
    }

    ConversationManifest {
        session_id: session_id.to_string(),
        project_id: project_id.to_string(),
        project_slug: project_slug(project_path),
        project_path: project_path.to_string(),
        archived_at: Utc::now(),
        auto_archived: false,
        title,
        start_time: session.start_time,
        end_time: session.end_time,
        duration_minutes: session.stats.duration_seconds / 60,
        user_questions,
        files_modified: files_modified.into_iter().collect(),
        tools_used: tools_used.into_iter().collect(),
        technologies: Vec::new(),
        plan_ids: Vec::new(),
        message_count: entries.len(),
        tool_call_count,
        context_snippet: None,
        user_label: None,
    }
}
