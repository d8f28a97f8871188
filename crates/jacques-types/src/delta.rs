use serde::{Deserialize, Serialize};

use crate::session::Session;

/// A single change-notification emitted by the registry to its subscribers
/// (GLOSSARY "Delta", spec.md §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryDelta {
    SessionUpserted { session: Session },
    SessionRemoved { id: String },
    FocusChanged {
        id: Option<String>,
        session: Option<Session>,
    },
}

impl RegistryDelta {
    /// The session id this delta concerns, if any — used by the
    /// subscriber fan-out's per-session coalescing (spec.md §4.3).
    pub fn session_id(&self) -> Option<&str> {
        match self {
            RegistryDelta::SessionUpserted { session } => Some(session.id.as_str()),
            RegistryDelta::SessionRemoved { id } => Some(id.as_str()),
            RegistryDelta::FocusChanged { .. } => None,
        }
    }

    /// Only `session_update` (here: `SessionUpserted`) may be coalesced
    /// under last-wins semantics; `session_removed` and `focus_changed`
    /// are never coalesced (spec.md §4.3).
    pub fn is_coalescible(&self) -> bool {
        matches!(self, RegistryDelta::SessionUpserted { .. })
    }
}
