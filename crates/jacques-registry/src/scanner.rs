//! Process Scanner (spec.md §4.5): finds vendor CLI processes already
//! running when the registry starts (or on demand), maps each one's
//! working directory to its transcript directory, and pairs live
//! processes with recently-active transcript files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use jacques_parser::{ProviderAdapter, SessionIndex};
use jacques_types::{EntryPayload, Source};

/// 60s JSONL-mtime threshold for "active" (spec.md §4.5).
const ACTIVE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct DetectedProcess {
    pub pid: u32,
    pub tty: String,
    pub cwd: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DetectedSession {
    pub pid: u32,
    pub tty: String,
    pub session_id: String,
    pub source: Source,
    pub project_root: Option<PathBuf>,
    pub title: Option<String>,
}

/// Enumerates currently-running vendor CLI processes (Linux: `/proc`).
/// Each process's controlling TTY and current working directory are read
/// from the kernel's per-process files, not inferred.
#[cfg(target_os = "linux")]
pub fn list_vendor_processes() -> Vec<DetectedProcess> {
    let mut found = Vec::new();
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return found;
    };
    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };
        let comm_path = format!("/proc/{pid}/comm");
        let Ok(comm) = std::fs::read_to_string(&comm_path) else {
            continue;
        };
        let comm = comm.trim();
        if !matches!(comm, "claude" | "cursor") {
            continue;
        }
        if !pid_alive(pid) {
            // Exited between the /proc readdir and this check.
            continue;
        }
        let cwd = std::fs::read_link(format!("/proc/{pid}/cwd")).unwrap_or_default();
        let tty = std::fs::read_link(format!("/proc/{pid}/fd/0"))
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        found.push(DetectedProcess { pid, tty, cwd });
    }
    found
}

/// `kill(pid, 0)` existence probe: sends no signal, just reports whether
/// the process is still addressable (unix semantics).
#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    true
}

#[cfg(not(target_os = "linux"))]
pub fn list_vendor_processes() -> Vec<DetectedProcess> {
    // No portable, dependency-free process table on this platform; the
    // scanner degrades to "no live processes found" rather than guessing.
    Vec::new()
}

fn is_recently_active(path: &Path) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|modified| {
            SystemTime::now()
                .duration_since(modified)
                .map(|age| age <= ACTIVE_WINDOW)
                .unwrap_or(true)
        })
        .unwrap_or(false)
}

/// Title priority (spec.md §4.5): first the vendor's own summary entry,
/// otherwise the first real user message, skipping any leading internal
/// command entries.
fn derive_title(adapter: &ProviderAdapter, path: &Path) -> Option<String> {
    let entries = adapter.parser.parse_file(path).ok()?;
    for entry in entries.iter().take(50) {
        if let EntryPayload::Summary(summary) = &entry.payload {
            return Some(summary.summary.clone());
        }
    }
    for entry in entries.iter().take(50) {
        if let EntryPayload::User(user) = &entry.payload
            && !user.internal
        {
            return Some(user.text.chars().take(80).collect());
        }
    }
    None
}

fn source_for_adapter(adapter: &ProviderAdapter) -> Source {
    match adapter.id() {
        "cursor" => Source::Cursor,
        _ => Source::ClaudeCode,
    }
}

/// Finds every active transcript session reachable from `adapter`'s
/// providers and pairs them with live processes by recency
/// (`min(processes, active sessions)` pairs; unmatched extras get a
/// synthetic `pid = 0, tty = "?"`, spec.md §4.5 "multi-session pairing").
pub fn scan_for_active_sessions(adapters: &[ProviderAdapter]) -> Vec<DetectedSession> {
    let processes = list_vendor_processes();
    let mut by_root: HashMap<PathBuf, Vec<DetectedProcess>> = HashMap::new();
    for process in processes {
        by_root.entry(process.cwd.clone()).or_default().push(process);
    }

    let mut detected = Vec::new();
    for adapter in adapters {
        let roots: Vec<PathBuf> = by_root.keys().cloned().collect();
        for root in &roots {
            let Some(log_root) = adapter.discovery.resolve_log_root(root) else {
                continue;
            };
            let Ok(sessions) = adapter.discovery.scan_sessions(&log_root) else {
                continue;
            };
            let mut active: Vec<&SessionIndex> = sessions
                .iter()
                .filter(|s| is_recently_active(&s.main_file))
                .collect();
            active.sort_by_key(|s| {
                std::fs::metadata(&s.main_file)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH)
            });
            active.reverse();

            let procs = by_root.get(root).cloned().unwrap_or_default();
            let pair_count = procs.len().min(active.len());

            for (i, session) in active.iter().enumerate() {
                let (pid, tty) = if i < pair_count {
                    (procs[i].pid, procs[i].tty.clone())
                } else {
                    (0, "?".to_string())
                };
                detected.push(DetectedSession {
                    pid,
                    tty,
                    session_id: session.session_id.clone(),
                    source: source_for_adapter(adapter),
                    project_root: session.project_root.clone(),
                    title: derive_title(adapter, &session.main_file),
                });
            }
        }
    }
    detected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recently_modified_file_is_active() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, "{}").unwrap();
        assert!(is_recently_active(&path));
    }

    #[test]
    fn missing_file_is_not_active() {
        assert!(!is_recently_active(Path::new("/nonexistent/path.jsonl")));
    }
}
