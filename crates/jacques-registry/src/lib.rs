//! Session Registry, Event Ingestion, Subscriber Fan-out and Process
//! Scanner (SPEC_FULL.md §4.1-§4.3, §4.5): the always-running server
//! component that tracks every live vendor CLI session and pushes its
//! state to connected UIs.

pub mod config;
pub mod error;
pub mod fanout;
pub mod ingestion;
pub mod registry;
pub mod scanner;

pub use error::{Error, Result};
pub use registry::{
    Registry, Subscription, spawn_stale_sweep, DEFAULT_STALE_MINUTES,
    DEFAULT_SWEEP_INTERVAL_MINUTES,
};
pub use scanner::{scan_for_active_sessions, DetectedProcess, DetectedSession};
