use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::Duration;

use jacques_registry::{spawn_stale_sweep, Registry};

use crate::cli::{Cli, ServeArgs};

/// Pre-flight checks (spec.md §5 "Pre-flight checks"): refuse to start
/// over a stale ingestion socket or an already-bound fan-out port rather
/// than silently taking over another instance.
fn preflight(socket_path: &str, ws_addr: &str) -> Result<()> {
    #[cfg(unix)]
    if std::path::Path::new(socket_path).exists() {
        match std::os::unix::net::UnixStream::connect(socket_path) {
            Ok(_) => anyhow::bail!("ingestion socket {socket_path} is already in use"),
            Err(_) => {
                std::fs::remove_file(socket_path)
                    .with_context(|| format!("failed to remove stale socket {socket_path}"))?;
            }
        }
    }

    if std::net::TcpListener::bind(ws_addr).is_err() {
        anyhow::bail!("fan-out port {ws_addr} is already in use");
    }

    Ok(())
}

pub fn run(cli: &Cli, args: ServeArgs) -> Result<()> {
    let mut config = super::load_config(cli)?;
    if let Some(port) = args.ws_port {
        config.ws_port = port;
    }
    let ws_addr = format!("0.0.0.0:{}", config.ws_port);

    preflight(&config.socket_path, &ws_addr)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(serve_async(config, ws_addr))
}

async fn serve_async(config: jacques_types::Config, ws_addr: String) -> Result<()> {
    let registry = Registry::new();

    let _sweep = spawn_stale_sweep(
        registry.clone(),
        StdDuration::from_secs(config.cleanup_interval_minutes * 60),
        Duration::minutes(config.stale_session_minutes as i64),
    );

    let ingestion_registry = registry.clone();
    let socket_path = config.socket_path.clone();
    #[cfg(unix)]
    let ingestion = tokio::spawn(async move {
        if let Err(err) = jacques_registry::ingestion::serve_unix(ingestion_registry, &socket_path).await {
            tracing::error!(%err, "ingestion listener exited");
        }
    });
    #[cfg(windows)]
    let ingestion = tokio::spawn(async move {
        if let Err(err) =
            jacques_registry::ingestion::serve_named_pipe(ingestion_registry, &socket_path).await
        {
            tracing::error!(%err, "ingestion listener exited");
        }
    });

    let fanout_registry = registry.clone();
    let fanout = tokio::spawn(async move {
        if let Err(err) = jacques_registry::fanout::serve(fanout_registry, &ws_addr).await {
            tracing::error!(%err, "fan-out listener exited");
        }
    });

    tracing::info!("jacques serving; press Ctrl+C to stop");
    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    ingestion.abort();
    fanout.abort();
    Ok(())
}
