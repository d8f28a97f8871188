use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::cli::Cli;

struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

/// Runs the server's pre-flight checks (spec.md §5 "Pre-flight checks")
/// without actually starting anything, for diagnosing a workspace.
pub fn run(cli: &Cli) -> Result<()> {
    let config = super::load_config(cli)?;
    let mut checks = Vec::new();

    checks.push(socket_check(&config.socket_path));
    checks.push(port_check(config.ws_port));
    checks.push(workspace_check(cli)?);

    let colorize = std::io::stdout().is_terminal();
    let mut all_ok = true;
    for check in &checks {
        all_ok &= check.ok;
        let status = match (check.ok, colorize) {
            (true, true) => "ok".green().to_string(),
            (true, false) => "ok".to_string(),
            (false, true) => "fail".red().to_string(),
            (false, false) => "fail".to_string(),
        };
        println!("[{status}] {}: {}", check.name, check.detail);
    }

    if !all_ok {
        anyhow::bail!("one or more pre-flight checks failed");
    }
    Ok(())
}

#[cfg(unix)]
fn socket_check(socket_path: &str) -> Check {
    let path = std::path::Path::new(socket_path);
    let ok = if !path.exists() {
        true
    } else {
        std::os::unix::net::UnixStream::connect(path).is_err()
    };
    Check {
        name: "ingestion socket",
        detail: if ok { format!("{socket_path} is free") } else { format!("{socket_path} is in use") },
        ok,
    }
}

#[cfg(not(unix))]
fn socket_check(socket_path: &str) -> Check {
    Check { name: "ingestion socket", ok: true, detail: format!("{socket_path} (unchecked on this platform)") }
}

fn port_check(ws_port: u16) -> Check {
    let addr = format!("0.0.0.0:{ws_port}");
    let ok = std::net::TcpListener::bind(&addr).is_ok();
    Check {
        name: "fan-out port",
        detail: if ok { format!("{addr} is free") } else { format!("{addr} is in use") },
        ok,
    }
}

fn workspace_check(cli: &Cli) -> Result<Check> {
    let root = super::workspace_root(cli)?;
    let ok = std::fs::create_dir_all(&root).is_ok();
    Ok(Check { name: "workspace directory", detail: root.display().to_string(), ok })
}
