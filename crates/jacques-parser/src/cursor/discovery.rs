use crate::traits::{LogProvider, ProbeResult, SessionIndex};
use anyhow::Result;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::schema::CursorRecord;

pub struct CursorDiscovery;

fn header_session_id(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let reader = BufReader::new(file);
    for line in reader.lines().take(50).flatten() {
        if let Ok(record) = serde_json::from_str::<CursorRecord>(&line) {
            match record {
                CursorRecord::User(m) | CursorRecord::Assistant(m) => return Some(m.session_id),
                CursorRecord::Unknown => continue,
            }
        }
    }
    None
}

impl LogProvider for CursorDiscovery {
    fn id(&self) -> &'static str {
        "cursor"
    }

    fn probe(&self, path: &Path) -> ProbeResult {
        if !path.is_file() || path.extension().is_none_or(|e| e != "jsonl") {
            return ProbeResult::NoMatch;
        }
        if header_session_id(path).is_some() {
            ProbeResult::match_medium()
        } else {
            ProbeResult::NoMatch
        }
    }

    fn resolve_log_root(&self, project_root: &Path) -> Option<PathBuf> {
        let encoded = jacques_core::encode_project_id(&project_root.to_string_lossy());
        dirs::home_dir().map(|home| home.join(".cursor").join("chats").join(encoded))
    }

    fn scan_sessions(&self, log_root: &Path) -> Result<Vec<SessionIndex>> {
        let mut sessions: HashMap<String, SessionIndex> = HashMap::new();

        for entry in WalkDir::new(log_root)
            .max_depth(2)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if self.probe(path) == ProbeResult::NoMatch {
                continue;
            }
            let Some(session_id) = header_session_id(path) else {
                continue;
            };
            sessions
                .entry(session_id.clone())
                .or_insert_with(|| SessionIndex {
                    session_id,
                    timestamp: None,
                    main_file: path.to_path_buf(),
                    sidechain_files: Vec::new(),
                    project_root: None,
                });
        }

        Ok(sessions.into_values().collect())
    }

    fn extract_session_id(&self, path: &Path) -> Result<String> {
        header_session_id(path)
            .ok_or_else(|| anyhow::anyhow!("No session_id in file: {}", path.display()))
    }

    fn find_session_files(&self, log_root: &Path, session_id: &str) -> Result<Vec<PathBuf>> {
        let mut matches = Vec::new();
        for entry in WalkDir::new(log_root)
            .max_depth(3)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if self.probe(path) == ProbeResult::NoMatch {
                continue;
            }
            if header_session_id(path).as_deref() == Some(session_id) {
                matches.push(path.to_path_buf());
            }
        }
        Ok(matches)
    }
}
