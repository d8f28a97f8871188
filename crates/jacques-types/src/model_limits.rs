/// Default context window size used when a session's model does not report
/// its own window (spec.md §4.4: "context size ... compared against a
/// 200,000-token window").
pub const DEFAULT_CONTEXT_WINDOW: u64 = 200_000;

/// Known bug in the upstream tool: auto-compact triggers near 78% of the
/// window even when the user-visible setting is disabled (spec.md §9b).
/// Exposed so UIs can surface the discrepancy; the server never acts on it.
pub const BUG_AUTOCOMPACT_THRESHOLD_PCT: f64 = 78.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub max_tokens: u64,
    pub compaction_buffer_pct: f64,
}

pub trait ModelLimitResolver {
    fn resolve_model_limit(&self, model: &str) -> Option<ModelSpec>;
}
