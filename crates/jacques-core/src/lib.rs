//! Path and project-id encoding utilities shared across Jacques crates.

pub mod path;

pub use path::*;
