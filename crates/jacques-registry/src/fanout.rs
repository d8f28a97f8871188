//! Subscriber Fan-out (spec.md §4.3): a websocket-style TCP server that
//! pushes registry deltas to connected UIs and accepts a small set of
//! client commands back. OS-level commands (`focus_terminal`,
//! `tile_windows`) are non-goals of this server (spec.md §1 "OS
//! window-positioning") — they are acknowledged but not acted on here.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use jacques_types::{RegistryDelta, Session};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use crate::registry::Registry;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutgoingFrame<'a> {
    InitialState {
        sessions: &'a [Session],
        focused_session_id: &'a Option<String>,
    },
    SessionUpdate {
        session: &'a Session,
    },
    SessionRemoved {
        id: &'a str,
    },
    FocusChanged {
        id: &'a Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientCommand {
    SelectSession { session_id: Option<String> },
    TriggerAction { session_id: String, action: String },
    ToggleAutocompact { session_id: String, enabled: bool },
    FocusTerminal { session_id: String },
    TileWindows,
}

fn delta_to_frame(delta: &RegistryDelta) -> OutgoingFrame<'_> {
    match delta {
        RegistryDelta::SessionUpserted { session } => OutgoingFrame::SessionUpdate { session },
        RegistryDelta::SessionRemoved { id } => OutgoingFrame::SessionRemoved { id },
        RegistryDelta::FocusChanged { id, .. } => OutgoingFrame::FocusChanged { id },
    }
}

async fn handle_command(registry: &Registry, command: ClientCommand) {
    match command {
        ClientCommand::SelectSession { session_id } => {
            if let Err(err) = registry.set_focused_session(session_id.as_deref()) {
                tracing::debug!(%err, "select_session failed");
            }
        }
        ClientCommand::TriggerAction { session_id, action } => {
            tracing::info!(%session_id, %action, "trigger_action received");
        }
        ClientCommand::ToggleAutocompact { session_id, enabled } => {
            if let Err(err) = registry.set_autocompact(&session_id, enabled) {
                tracing::debug!(%err, "toggle_autocompact failed");
            }
        }
        ClientCommand::FocusTerminal { session_id } => {
            tracing::debug!(%session_id, "focus_terminal is a non-goal no-op");
        }
        ClientCommand::TileWindows => {
            tracing::debug!("tile_windows is a non-goal no-op");
        }
    }
}

async fn handle_socket(registry: Arc<Registry>, stream: tokio::net::TcpStream) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            tracing::debug!(%err, "websocket handshake failed");
            return;
        }
    };
    let (mut sink, mut stream) = ws.split();

    let (sessions, focused, subscription) = registry.subscribe();
    let initial = OutgoingFrame::InitialState {
        sessions: &sessions,
        focused_session_id: &focused,
    };
    if let Ok(text) = serde_json::to_string(&initial)
        && sink.send(Message::Text(text.into())).await.is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            deltas = subscription.recv() => {
                for delta in &deltas {
                    let frame = delta_to_frame(delta);
                    match serde_json::to_string(&frame) {
                        Ok(text) => {
                            if sink.send(Message::Text(text.into())).await.is_err() {
                                return;
                            }
                        }
                        Err(err) => tracing::warn!(%err, "failed to encode delta"),
                    }
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientCommand>(&text) {
                            Ok(command) => handle_command(&registry, command).await,
                            Err(err) => tracing::warn!(%err, "malformed client command"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(%err, "websocket read error");
                        return;
                    }
                }
            }
        }
    }
}

/// Runs the subscriber fan-out server until the process exits.
pub async fn serve(registry: Arc<Registry>, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "subscriber fan-out listening");
    loop {
        let (stream, _peer) = listener.accept().await?;
        let registry = registry.clone();
        tokio::spawn(handle_socket(registry, stream));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_update_frame_serializes_with_type_tag() {
        let session = Session::minimal("s1", chrono::Utc::now());
        let delta = RegistryDelta::SessionUpserted { session };
        let frame = delta_to_frame(&delta);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "session_update");
    }

    #[test]
    fn focus_changed_frame_carries_id() {
        let delta = RegistryDelta::FocusChanged { id: Some("s1".to_string()), session: None };
        let frame = delta_to_frame(&delta);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "focus_changed");
        assert_eq!(json["id"], "s1");
    }
}
