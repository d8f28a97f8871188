use serde::{Deserialize, Serialize};

/// One of the three conversation-archive filtering modes (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFilter {
    Everything,
    WithoutTools,
    MessagesOnly,
}

impl Default for ArchiveFilter {
    fn default() -> Self {
        ArchiveFilter::Everything
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub filter: ArchiveFilter,
    #[serde(default = "default_true")]
    pub auto_archive: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            filter: ArchiveFilter::default(),
            auto_archive: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Recognised configuration keys and their effects (spec.md §6). An
/// unrecognised key in a loaded TOML file is logged and ignored (spec.md §9
/// "Dynamic-config dictionaries -> enumerated config struct"); unknown
/// fields on this struct are simply absent from the deserialized value
/// because `#[serde(deny_unknown_fields)]` is deliberately not set here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub socket_path: String,
    pub ws_port: u16,
    pub http_port: Option<u16>,
    pub autocompact_threshold: u32,
    pub stale_session_minutes: u64,
    pub cleanup_interval_minutes: u64,
    pub archive: ArchiveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            ws_port: 9871,
            http_port: None,
            autocompact_threshold: 80,
            stale_session_minutes: 60,
            cleanup_interval_minutes: 5,
            archive: ArchiveConfig::default(),
        }
    }
}

#[cfg(unix)]
fn default_socket_path() -> String {
    "/tmp/jacques.sock".to_string()
}

#[cfg(windows)]
fn default_socket_path() -> String {
    r"\\.\pipe\jacques".to_string()
}
