use std::path::PathBuf;

use jacques_types::Config;

use crate::Result;

/// Loads the recognised configuration (spec.md §6) from `path`, falling
/// back to defaults for any missing or unrecognised keys. A missing file
/// is not an error — it simply yields [`Config::default`]. `JACQUES_*`
/// environment variables override whatever the file (or default) set.
pub fn load(path: &PathBuf) -> Result<Config> {
    let mut config = if !path.exists() {
        Config::default()
    } else {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(v) = std::env::var("JACQUES_SOCKET_PATH") {
        config.socket_path = v;
    }
    if let Some(v) = env_parsed("JACQUES_WS_PORT") {
        config.ws_port = v;
    }
    if let Some(v) = env_parsed("JACQUES_HTTP_PORT") {
        config.http_port = Some(v);
    }
    if let Some(v) = env_parsed("JACQUES_AUTOCOMPACT_THRESHOLD") {
        config.autocompact_threshold = v;
    }
    if let Some(v) = env_parsed("JACQUES_STALE_SESSION_MINUTES") {
        config.stale_session_minutes = v;
    }
    if let Some(v) = env_parsed("JACQUES_CLEANUP_INTERVAL_MINUTES") {
        config.cleanup_interval_minutes = v;
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

pub fn save(config: &Config, path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| crate::Error::Config(e.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default config file location: `<workspace path>/config.toml`.
pub fn default_path() -> Result<PathBuf> {
    jacques_core::resolve_workspace_path(None)
        .map(|root| root.join("config.toml"))
        .map_err(|e| crate::Error::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config.ws_port, Config::default().ws_port);
    }

    #[test]
    fn env_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save(&Config::default(), &path).unwrap();

        std::env::set_var("JACQUES_WS_PORT", "4242");
        let config = load(&path).unwrap();
        std::env::remove_var("JACQUES_WS_PORT");

        assert_eq!(config.ws_port, 4242);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.ws_port = 9999;
        save(&config, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.ws_port, 9999);
    }
}
