pub mod archive;
pub mod doctor;
pub mod scan;
pub mod search;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::Cli;

/// Resolves the workspace root from `--data-dir`, falling back to the
/// platform default (spec.md §6).
pub fn workspace_root(cli: &Cli) -> Result<PathBuf> {
    jacques_core::resolve_workspace_path(cli.data_dir.as_deref())
        .context("failed to resolve workspace path")
}

pub fn load_config(cli: &Cli) -> Result<jacques_types::Config> {
    let path = workspace_root(cli)?.join("config.toml");
    jacques_registry::config::load(&path).context("failed to load config")
}
