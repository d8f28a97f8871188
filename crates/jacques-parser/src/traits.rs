use anyhow::Result;
use jacques_types::ParsedEntry;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Provider discovery and lifecycle management.
///
/// Responsibilities:
/// - identify a provider from file paths/patterns
/// - locate session files on the filesystem
/// - extract lightweight session metadata without a full parse
pub trait LogProvider: Send + Sync {
    /// Unique provider ID (spec.md §4.2 `source` tag, e.g. `claude_code`, `cursor`).
    fn id(&self) -> &'static str;

    /// Check whether a file belongs to this provider.
    fn probe(&self, path: &Path) -> ProbeResult;

    /// Resolve the log root directory for a given project root, if this
    /// provider organizes transcripts by project.
    fn resolve_log_root(&self, project_root: &Path) -> Option<PathBuf>;

    /// Scan a log root for sessions.
    fn scan_sessions(&self, log_root: &Path) -> Result<Vec<SessionIndex>>;

    /// Extract the session id from a file header (no full parse).
    fn extract_session_id(&self, path: &Path) -> Result<String>;

    /// Find all files belonging to a session (main + sidechains).
    fn find_session_files(&self, log_root: &Path, session_id: &str) -> Result<Vec<PathBuf>>;
}

/// Session data normalization: turns a raw transcript file into
/// [`ParsedEntry`] values (spec.md §4.4).
pub trait SessionParser: Send + Sync {
    /// Parse an entire file into its entry stream.
    fn parse_file(&self, path: &Path) -> Result<Vec<ParsedEntry>>;

    /// Parse a single line for streaming/tail-mode consumption. Returns
    /// `None` for malformed or incomplete lines (non-fatal).
    fn parse_record(&self, content: &str) -> Result<Option<ParsedEntry>>;
}

/// Tool call semantic interpretation for display/summary purposes.
pub trait ToolMapper: Send + Sync {
    /// Classify a tool by coarse kind, for UI grouping.
    fn classify(&self, tool_name: &str) -> ToolKind;

    /// Extract a short human summary of a tool call's arguments.
    fn summarize(&self, tool_name: &str, args: &Value) -> Option<String>;
}

/// Coarse tool classification used by handoff/summary generation
/// (spec.md §4.9 "toolsUsed"). Not part of the wire model — purely a
/// display aid local to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Read,
    Write,
    Execute,
    Search,
    Plan,
    Ask,
    Other,
}

/// Probe result with confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResult {
    Confidence(f32),
    NoMatch,
}

impl ProbeResult {
    pub fn match_high() -> Self {
        ProbeResult::Confidence(1.0)
    }

    pub fn match_medium() -> Self {
        ProbeResult::Confidence(0.5)
    }

    pub fn match_low() -> Self {
        ProbeResult::Confidence(0.3)
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ProbeResult::Confidence(c) if *c > 0.0)
    }

    pub fn confidence(&self) -> f32 {
        match self {
            ProbeResult::Confidence(c) => *c,
            ProbeResult::NoMatch => 0.0,
        }
    }
}

/// Session index metadata returned by a provider's directory scan.
#[derive(Debug, Clone)]
pub struct SessionIndex {
    pub session_id: String,
    pub timestamp: Option<String>,
    pub main_file: PathBuf,
    pub sidechain_files: Vec<PathBuf>,
    pub project_root: Option<PathBuf>,
}

/// Bundles the three per-provider trait implementations behind a single
/// handle, so the registry and session registry don't need to know which
/// concrete provider they're talking to.
pub struct ProviderAdapter {
    pub discovery: Box<dyn LogProvider>,
    pub parser: Box<dyn SessionParser>,
    pub mapper: Box<dyn ToolMapper>,
}

impl ProviderAdapter {
    pub fn new(
        discovery: Box<dyn LogProvider>,
        parser: Box<dyn SessionParser>,
        mapper: Box<dyn ToolMapper>,
    ) -> Self {
        Self {
            discovery,
            parser,
            mapper,
        }
    }

    pub fn from_name(provider_name: &str) -> Result<Self> {
        match provider_name {
            "claude_code" | "claude" => Ok(Self::claude()),
            "cursor" => Ok(Self::cursor()),
            _ => anyhow::bail!("Unknown provider: {}", provider_name),
        }
    }

    pub fn claude() -> Self {
        Self::new(
            Box::new(crate::claude::ClaudeDiscovery),
            Box::new(crate::claude::ClaudeParser),
            Box::new(crate::claude::ClaudeToolMapper),
        )
    }

    pub fn cursor() -> Self {
        Self::new(
            Box::new(crate::cursor::CursorDiscovery),
            Box::new(crate::cursor::CursorParser),
            Box::new(crate::cursor::CursorToolMapper),
        )
    }

    pub fn id(&self) -> &'static str {
        self.discovery.id()
    }

    pub fn process_file(&self, path: &Path) -> Result<Vec<ParsedEntry>> {
        if !self.discovery.probe(path).is_match() {
            anyhow::bail!(
                "Provider {} cannot handle file: {}",
                self.id(),
                path.display()
            );
        }
        self.parser.parse_file(path)
    }
}
