//! Archive Store, Plan Extractor, Search Indexer, and Handoff Generator
//! (SPEC_FULL.md §4.6-§4.9): the on-disk, per-project + global catalog of
//! archived conversations, embedded plans, and cross-project keyword
//! search, plus the rule-based handoff summary used to resume a session.

pub mod atomic;
pub mod error;
pub mod handoff;
pub mod layout;
pub mod plans;
pub mod search;
pub mod store;

pub use error::{Error, Result};
pub use handoff::{Handoff, build_handoff, estimate_markdown_tokens, render_markdown};
pub use layout::{ArchiveLayout, ProjectLayout, conversation_filename, plan_filename};
pub use plans::link_or_copy_plan;
pub use search::{search, tokenize};
pub use store::ArchiveStore;
