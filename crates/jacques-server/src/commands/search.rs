use anyhow::{Context, Result};
use jacques_archive::atomic::read_json_optional;
use jacques_archive::search;
use jacques_types::SearchIndex;

use crate::cli::{Cli, SearchArgs};

pub fn run(cli: &Cli, args: SearchArgs) -> Result<()> {
    let root = super::workspace_root(cli)?;
    let index_path = root.join("archive").join("index.json");
    let index: SearchIndex = read_json_optional(&index_path)
        .context("failed to read search index")?
        .unwrap_or_default();

    let ranked = search(&index, &args.query);
    if ranked.is_empty() {
        println!("no matches for \"{}\"", args.query);
        return Ok(());
    }
    for (session_id, score) in ranked {
        println!("{score:>8.2}  {session_id}");
    }
    Ok(())
}
