use clap::{Args, Parser, Subcommand};

use crate::logging::LogLevel;

#[derive(Parser)]
#[command(name = "jacques")]
#[command(about = "Real-time context-usage monitor and conversation archive for AI coding assistants")]
#[command(version)]
pub struct Cli {
    /// Workspace root for the registry config, archive store, and search index.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run ingestion + subscriber fan-out (and the optional HTTP query port).
    Serve(ServeArgs),
    /// Run the Process Scanner once and print detected sessions as JSON.
    Scan,
    /// Archive one session: archive + plan-extract + handoff.
    Archive(ArchiveArgs),
    /// Query the global search index.
    Search(SearchArgs),
    /// Run pre-flight checks and report the workspace's health.
    Doctor,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override the configured WebSocket fan-out port.
    #[arg(long)]
    pub ws_port: Option<u16>,
}

#[derive(Args)]
pub struct ArchiveArgs {
    pub session_id: String,

    /// Path to the session's transcript file (NDJSON, already parsed if omitted).
    #[arg(long)]
    pub transcript: Option<String>,

    /// Project root to mirror the archive into (defaults to the current directory).
    #[arg(long)]
    pub project_root: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    pub query: String,
}
