use anyhow::Result;
use jacques_parser::create_all_adapters;
use jacques_registry::scan_for_active_sessions;

use crate::cli::Cli;

pub fn run(_cli: &Cli) -> Result<()> {
    let adapters = create_all_adapters();
    let detected = scan_for_active_sessions(&adapters);
    println!("{}", serde_json::to_string_pretty(&detected_as_json(&detected))?);
    Ok(())
}

fn detected_as_json(detected: &[jacques_registry::DetectedSession]) -> serde_json::Value {
    let sessions: Vec<serde_json::Value> = detected
        .iter()
        .map(|s| {
            serde_json::json!({
                "pid": s.pid,
                "tty": s.tty,
                "session_id": s.session_id,
                "source": s.source,
                "project_root": s.project_root,
                "title": s.title,
            })
        })
        .collect();
    serde_json::Value::Array(sessions)
}
