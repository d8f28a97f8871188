//! Testing infrastructure shared across Jacques's crates.
//!
//! - `TestWorld`: fluent interface for declarative `jacques` CLI tests
//! - `assertions`: custom assertions for manifests, search index, scan output
//! - `fixtures`: synthetic vendor-transcript generation
//! - `process`: background process management for long-running commands
//! - `providers`: provider-specific testing utilities

pub mod assertions;
pub mod fixtures;
pub mod process;
pub mod providers;
pub mod world;

pub use world::TestWorld;
