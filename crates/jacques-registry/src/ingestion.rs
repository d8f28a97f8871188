//! Event Ingestion (spec.md §4.2): a local IPC listener (AF_UNIX socket on
//! POSIX, a named pipe on Windows) that accepts NDJSON-framed events from
//! vendor CLI hook scripts and applies them to the [`Registry`].
//!
//! Entries within one connection arrive in order and are applied in that
//! order; no ordering is guaranteed across connections (spec.md §4.2).

use std::sync::Arc;

use jacques_types::{ContextMetrics, ModelInfo, Session, SessionStatus, Source, TerminalKey};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::registry::Registry;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IngestEvent {
    SessionStart {
        session_id: String,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        project_path: Option<String>,
        #[serde(default)]
        working_directory: Option<String>,
        #[serde(default)]
        terminal_key: Option<String>,
        #[serde(default)]
        model_display_name: Option<String>,
        #[serde(default)]
        model_id: Option<String>,
        #[serde(default)]
        transcript_path: Option<String>,
        #[serde(default)]
        git_branch: Option<String>,
    },
    SessionEnd {
        session_id: String,
    },
    Activity {
        session_id: String,
    },
    ContextUpdate {
        session_id: String,
        used_percentage: f64,
        context_window_size: u64,
        total_input_tokens: u64,
        total_output_tokens: u64,
        #[serde(default)]
        cache_creation_tokens: Option<u64>,
        #[serde(default)]
        cache_read_tokens: Option<u64>,
        #[serde(default)]
        is_estimate: bool,
    },
    SessionIdle {
        session_id: String,
    },
}

/// Applies one decoded ingestion event to the registry (spec.md §4.2's
/// event-to-registry-call taxonomy).
fn apply_event(registry: &Registry, event: IngestEvent) {
    match event {
        IngestEvent::SessionStart {
            session_id,
            source,
            project_path,
            working_directory,
            terminal_key,
            model_display_name,
            model_id,
            transcript_path,
            git_branch,
        } => {
            let now = chrono::Utc::now();
            let session = Session {
                id: session_id.clone(),
                source: source.as_deref().map(Source::normalize).unwrap_or(Source::Unknown),
                project_path,
                working_directory,
                project_display_name: None,
                terminal_key: terminal_key.map(TerminalKey).unwrap_or_else(TerminalKey::unknown),
                model: ModelInfo { display_name: model_display_name, id: model_id },
                status: SessionStatus::Active,
                created_at: now,
                last_activity: now,
                autocompact_enabled: true,
                context_metrics: None,
                transcript_path,
                git_branch,
                title: None,
            };
            registry.register_session(session);
        }
        IngestEvent::SessionEnd { session_id } => {
            if let Err(err) = registry.unregister_session(&session_id) {
                tracing::debug!(%session_id, %err, "session_end for unknown session");
            }
        }
        IngestEvent::Activity { session_id } => {
            if let Err(err) = registry.update_activity(&session_id) {
                tracing::debug!(%session_id, %err, "activity for unknown session");
            }
        }
        IngestEvent::ContextUpdate {
            session_id,
            used_percentage,
            context_window_size,
            total_input_tokens,
            total_output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
            is_estimate,
        } => {
            let mut metrics = ContextMetrics::new(
                used_percentage,
                context_window_size,
                total_input_tokens,
                total_output_tokens,
                is_estimate,
            );
            metrics.cache_creation_tokens = cache_creation_tokens;
            metrics.cache_read_tokens = cache_read_tokens;
            registry.update_context(&session_id, metrics);
        }
        IngestEvent::SessionIdle { session_id } => {
            if let Err(err) = registry.set_session_idle(&session_id) {
                tracing::debug!(%session_id, %err, "session_idle for unknown session");
            }
        }
    }
}

async fn handle_connection<R: tokio::io::AsyncRead + Unpin>(
    registry: Arc<Registry>,
    reader: R,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<IngestEvent>(trimmed) {
                    Ok(event) => apply_event(&registry, event),
                    Err(err) => tracing::warn!(%err, line = trimmed, "malformed ingestion event"),
                }
            }
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(%err, "ingestion connection read error");
                return;
            }
        }
    }
}

#[cfg(unix)]
pub async fn serve_unix(registry: Arc<Registry>, socket_path: &str) -> std::io::Result<()> {
    let _ = std::fs::remove_file(socket_path);
    let listener = tokio::net::UnixListener::bind(socket_path)?;
    tracing::info!(path = socket_path, "ingestion listening on unix socket");
    loop {
        let (stream, _addr) = listener.accept().await?;
        let registry = registry.clone();
        tokio::spawn(async move {
            let (reader, _writer) = stream.into_split();
            handle_connection(registry, reader).await;
        });
    }
}

#[cfg(windows)]
pub async fn serve_named_pipe(registry: Arc<Registry>, pipe_name: &str) -> std::io::Result<()> {
    use tokio::net::windows::named_pipe::ServerOptions;

    tracing::info!(name = pipe_name, "ingestion listening on named pipe");
    loop {
        let server = ServerOptions::new().create(pipe_name)?;
        server.connect().await?;
        let registry = registry.clone();
        tokio::spawn(async move {
            handle_connection(registry, server).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_start_registers_with_normalized_source() {
        let registry = Registry::new();
        let event: IngestEvent = serde_json::from_str(
            r#"{"type":"session_start","session_id":"s1","source":"startup"}"#,
        )
        .unwrap();
        apply_event(&registry, event);
        let session = registry.get_session("s1").unwrap();
        assert_eq!(session.source, Source::ClaudeCode);
    }

    #[test]
    fn context_update_auto_registers() {
        let registry = Registry::new();
        let event: IngestEvent = serde_json::from_str(
            r#"{"type":"context_update","session_id":"s2","used_percentage":10.0,
                "context_window_size":200000,"total_input_tokens":1000,
                "total_output_tokens":200,"is_estimate":true}"#,
        )
        .unwrap();
        apply_event(&registry, event);
        assert!(registry.get_session("s2").is_some());
    }

    #[test]
    fn activity_marks_session_working() {
        let registry = Registry::new();
        registry.register_session(Session::minimal("s1", chrono::Utc::now()));
        apply_event(
            &registry,
            serde_json::from_str(r#"{"type":"activity","session_id":"s1"}"#).unwrap(),
        );
        assert_eq!(registry.get_session("s1").unwrap().status, SessionStatus::Working);
    }
}
