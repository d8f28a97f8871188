//! Session Registry (spec.md §4.1): the single in-memory source of truth
//! for live sessions, their focus state, and the delta stream handed to
//! subscribers. All mutation goes through one `Mutex`-guarded state —
//! there is exactly one writer, matching the spec's single-writer
//! concurrency requirement.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use jacques_types::{ContextMetrics, RegistryDelta, Session, SessionStatus};
use tokio::sync::Notify;

use crate::{Error, Result};

const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_STALE_MINUTES: i64 = 60;
pub const DEFAULT_SWEEP_INTERVAL_MINUTES: u64 = 5;

/// A subscriber's outbound delta queue: bounded, with last-wins
/// coalescing for `session_update` deltas only (spec.md §4.3) —
/// `session_removed` and `focus_changed` are always appended in full,
/// even past capacity pressure, by evicting the oldest entry instead.
struct SubscriberQueue {
    deltas: VecDeque<RegistryDelta>,
    capacity: usize,
}

impl SubscriberQueue {
    fn new(capacity: usize) -> Self {
        Self {
            deltas: VecDeque::new(),
            capacity,
        }
    }

    fn push(&mut self, delta: RegistryDelta) {
        if delta.is_coalescible()
            && let Some(id) = delta.session_id()
            && let Some(slot) = self
                .deltas
                .iter_mut()
                .find(|d| d.is_coalescible() && d.session_id() == Some(id))
        {
            *slot = delta;
            return;
        }
        if self.deltas.len() >= self.capacity {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta);
    }

    fn drain(&mut self) -> Vec<RegistryDelta> {
        self.deltas.drain(..).collect()
    }
}

struct SubscriberHandle {
    id: u64,
    queue: Arc<Mutex<SubscriberQueue>>,
    notify: Arc<Notify>,
}

struct State {
    sessions: HashMap<String, Session>,
    focused: Option<String>,
    /// Set once `setFocusedSession` is called explicitly; while set,
    /// ordinary session mutations no longer shift focus (spec.md §4.1
    /// "manual override until invalidated"). Invalidated when the
    /// focused session is removed or the caller clears focus.
    manual_focus_override: bool,
    subscribers: Vec<SubscriberHandle>,
    next_subscriber_id: u64,
}

/// The registry's live handle to one subscriber's delta stream. Dropping
/// this unsubscribes.
pub struct Subscription {
    id: u64,
    queue: Arc<Mutex<SubscriberQueue>>,
    notify: Arc<Notify>,
    registry: Arc<Registry>,
}

impl Subscription {
    /// Waits for at least one pending delta, then drains and returns
    /// everything queued (after coalescing).
    pub async fn recv(&self) -> Vec<RegistryDelta> {
        loop {
            let batch = {
                let mut q = self.queue.lock().unwrap();
                q.drain()
            };
            if !batch.is_empty() {
                return batch;
            }
            self.notify.notified().await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove_subscriber(self.id);
    }
}

pub struct Registry {
    state: Mutex<State>,
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                sessions: HashMap::new(),
                focused: None,
                manual_focus_override: false,
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            }),
        })
    }

    fn broadcast(&self, state: &State, delta: RegistryDelta) {
        for sub in &state.subscribers {
            sub.queue.lock().unwrap().push(delta.clone());
            sub.notify.notify_one();
        }
    }

    fn remove_subscriber(&self, id: u64) {
        let mut state = self.state.lock().unwrap();
        state.subscribers.retain(|s| s.id != id);
    }

    /// Shift-on-mutation focus policy (spec.md §4.1): any mutation to a
    /// session moves focus to it unless a manual override is in effect.
    /// Returns the `FocusChanged` delta to broadcast, if focus moved.
    fn maybe_shift_focus(&self, state: &mut State, id: &str) -> Option<RegistryDelta> {
        if state.manual_focus_override || state.focused.as_deref() == Some(id) {
            return None;
        }
        state.focused = Some(id.to_string());
        let session = state.sessions.get(id).cloned();
        Some(RegistryDelta::FocusChanged {
            id: Some(id.to_string()),
            session,
        })
    }

    pub fn register_session(&self, meta: Session) {
        let mut state = self.state.lock().unwrap();
        match state.sessions.get_mut(&meta.id) {
            Some(existing) => existing.merge_registration(meta.clone()),
            None => {
                state.sessions.insert(meta.id.clone(), meta.clone());
            }
        }
        let session = state.sessions.get(&meta.id).cloned().unwrap();
        let focus_delta = self.maybe_shift_focus(&mut state, &session.id);
        self.broadcast(&state, RegistryDelta::SessionUpserted { session });
        if let Some(delta) = focus_delta {
            self.broadcast(&state, delta);
        }
    }

    pub fn unregister_session(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.sessions.remove(id).is_none() {
            return Err(Error::UnknownSession(id.to_string()));
        }
        if state.focused.as_deref() == Some(id) {
            // Focus shifts to whichever remaining session was most
            // recently active (spec.md §4.1); the override no longer
            // applies since its target is gone.
            let next = state
                .sessions
                .values()
                .max_by_key(|s| s.last_activity)
                .map(|s| s.id.clone());
            state.focused = next.clone();
            state.manual_focus_override = false;
            let session = next.clone().and_then(|id| state.sessions.get(&id).cloned());
            self.broadcast(&state, RegistryDelta::FocusChanged { id: next, session });
        }
        self.broadcast(&state, RegistryDelta::SessionRemoved { id: id.to_string() });
        Ok(())
    }

    fn mutate_session(&self, id: &str, f: impl FnOnce(&mut Session, DateTime<Utc>)) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        match state.sessions.get_mut(id) {
            Some(session) => f(session, now),
            None => return Err(Error::UnknownSession(id.to_string())),
        }
        let session = state.sessions.get(id).cloned().unwrap();
        let focus_delta = self.maybe_shift_focus(&mut state, id);
        self.broadcast(&state, RegistryDelta::SessionUpserted { session });
        if let Some(delta) = focus_delta {
            self.broadcast(&state, delta);
        }
        Ok(())
    }

    pub fn update_activity(&self, id: &str) -> Result<()> {
        self.mutate_session(id, |s, now| {
            s.last_activity = now;
            s.status = SessionStatus::Working;
        })
    }

    pub fn set_autocompact(&self, id: &str, enabled: bool) -> Result<()> {
        self.mutate_session(id, |s, _now| {
            s.autocompact_enabled = enabled;
        })
    }

    /// `updateContext` is the one call that auto-registers an unknown
    /// session with minimal defaults rather than erroring (spec.md
    /// §4.1 "Auto-registration").
    pub fn update_context(&self, id: &str, metrics: ContextMetrics) {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let session = state
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::minimal(id, now));
        match &mut session.context_metrics {
            Some(existing) => existing.apply_update(metrics),
            None => session.context_metrics = Some(metrics),
        }
        session.last_activity = now;
        let session_clone = session.clone();
        let focus_delta = self.maybe_shift_focus(&mut state, id);
        self.broadcast(&state, RegistryDelta::SessionUpserted { session: session_clone });
        if let Some(delta) = focus_delta {
            self.broadcast(&state, delta);
        }
    }

    pub fn set_session_idle(&self, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.sessions.get_mut(id) {
            Some(session) => session.status = SessionStatus::Idle,
            None => return Err(Error::UnknownSession(id.to_string())),
        }
        let session = state.sessions.get(id).cloned().unwrap();
        self.broadcast(&state, RegistryDelta::SessionUpserted { session });
        Ok(())
    }

    pub fn set_focused_session(&self, id: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = id {
            if !state.sessions.contains_key(id) {
                return Err(Error::UnknownSession(id.to_string()));
            }
        }
        state.focused = id.map(str::to_string);
        state.manual_focus_override = id.is_some();
        let session = state.focused.clone().and_then(|id| state.sessions.get(&id).cloned());
        self.broadcast(
            &state,
            RegistryDelta::FocusChanged { id: state.focused.clone(), session },
        );
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> Option<Session> {
        self.state.lock().unwrap().sessions.get(id).cloned()
    }

    pub fn list_sessions(&self) -> Vec<Session> {
        self.state.lock().unwrap().sessions.values().cloned().collect()
    }

    pub fn get_focused_session(&self) -> Option<Session> {
        let state = self.state.lock().unwrap();
        state.focused.as_ref().and_then(|id| state.sessions.get(id).cloned())
    }

    pub fn subscribe(self: &Arc<Self>) -> (Vec<Session>, Option<String>, Subscription) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;
        let queue = Arc::new(Mutex::new(SubscriberQueue::new(DEFAULT_QUEUE_CAPACITY)));
        let notify = Arc::new(Notify::new());
        state.subscribers.push(SubscriberHandle {
            id,
            queue: queue.clone(),
            notify: notify.clone(),
        });
        let sessions: Vec<Session> = state.sessions.values().cloned().collect();
        let focused = state.focused.clone();
        drop(state);
        (
            sessions,
            focused,
            Subscription { id, queue, notify, registry: self.clone() },
        )
    }

    /// Removes every session whose `last_activity` is older than
    /// `stale_after` (spec.md §4.1 "Stale sweep", default 60 minutes).
    /// Intended to run on a fixed interval (default every 5 minutes) via
    /// [`spawn_stale_sweep`].
    pub fn sweep_stale(&self, stale_after: Duration) -> Vec<String> {
        let cutoff = Utc::now() - stale_after;
        let stale_ids: Vec<String> = {
            let state = self.state.lock().unwrap();
            state
                .sessions
                .values()
                .filter(|s| s.last_activity < cutoff)
                .map(|s| s.id.clone())
                .collect()
        };
        for id in &stale_ids {
            let _ = self.unregister_session(id);
        }
        stale_ids
    }
}

/// Spawns the background stale-session sweep task (spec.md §4.1).
pub fn spawn_stale_sweep(
    registry: Arc<Registry>,
    sweep_interval: StdDuration,
    stale_after: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let removed = registry.sweep_stale(stale_after);
            if !removed.is_empty() {
                tracing::info!(count = removed.len(), "stale sweep removed sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacques_types::Session;

    fn session(id: &str) -> Session {
        Session::minimal(id, Utc::now())
    }

    #[test]
    fn registering_first_session_focuses_it() {
        let registry = Registry::new();
        registry.register_session(session("s1"));
        assert_eq!(registry.get_focused_session().unwrap().id, "s1");
    }

    #[test]
    fn updating_activity_on_unfocused_session_shifts_focus() {
        let registry = Registry::new();
        registry.register_session(session("s1"));
        registry.register_session(session("s2"));
        registry.update_activity("s2").unwrap();
        assert_eq!(registry.get_focused_session().unwrap().id, "s2");
    }

    #[test]
    fn manual_override_blocks_shift_on_mutation() {
        let registry = Registry::new();
        registry.register_session(session("s1"));
        registry.register_session(session("s2"));
        registry.set_focused_session(Some("s1")).unwrap();
        registry.update_activity("s2").unwrap();
        assert_eq!(registry.get_focused_session().unwrap().id, "s1");
    }

    #[test]
    fn removing_focused_session_refocuses_most_recent() {
        let registry = Registry::new();
        registry.register_session(session("s1"));
        let mut later = session("s2");
        later.last_activity = Utc::now() + Duration::seconds(10);
        registry.register_session(later);
        registry.set_focused_session(Some("s1")).unwrap();
        registry.unregister_session("s1").unwrap();
        assert_eq!(registry.get_focused_session().unwrap().id, "s2");
    }

    #[test]
    fn update_context_auto_registers_unknown_session() {
        let registry = Registry::new();
        registry.update_context("ghost", ContextMetrics::zero());
        assert!(registry.get_session("ghost").is_some());
    }

    #[test]
    fn unregistering_unknown_session_is_an_error() {
        let registry = Registry::new();
        assert!(matches!(
            registry.unregister_session("nope"),
            Err(Error::UnknownSession(_))
        ));
    }

    #[tokio::test]
    async fn subscriber_coalesces_repeated_session_updates() {
        let registry = Registry::new();
        let (_, _, sub) = registry.subscribe();
        registry.register_session(session("s1"));
        registry.update_activity("s1").unwrap();
        registry.update_activity("s1").unwrap();

        let batch = sub.recv().await;
        // Three SessionUpserted deltas for the same id coalesce into one.
        assert_eq!(batch.len(), 1);
    }
}
