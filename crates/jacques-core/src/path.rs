use std::fmt;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Resolve the global archive root based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. `JACQUES_PATH` environment variable (with tilde expansion)
/// 3. System data directory (recommended default)
/// 4. `~/.jacques` (fallback for systems without a standard data directory)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("JACQUES_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("jacques"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".jacques"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or system data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Discover project root based on priority:
/// 1. explicit_project_root (--project-root flag)
/// 2. `JACQUES_PROJECT_ROOT` environment variable
/// 3. Current working directory
pub fn discover_project_root(explicit_project_root: Option<&str>) -> Result<PathBuf> {
    if let Some(root) = explicit_project_root {
        return Ok(PathBuf::from(root));
    }

    if let Ok(env_root) = std::env::var("JACQUES_PROJECT_ROOT") {
        return Ok(PathBuf::from(env_root));
    }

    Ok(std::env::current_dir()?)
}

/// Canonical encoding of a project path into the vendor's `projectId`
/// scheme (spec.md §4.7, §6 "Transcript path encoding"): every `/` is
/// replaced with `-`, and a leading separator is preserved as a leading
/// `-`. This is exactly how the vendor CLI names its own per-project
/// transcript directory, so it must match byte-for-byte.
pub fn encode_project_id(project_path: &str) -> String {
    project_path.replace('/', "-")
}

/// Naive decoder: replaces every `-` with `/`. Documented lossy per
/// spec.md §4.7/§9d — directory names containing a dash make this
/// ambiguous. Never use this when a sidecar `originalPath` is available;
/// see [`decode_project_id`].
pub fn naive_decode_project_id(project_id: &str) -> String {
    project_id.replace('-', "/")
}

/// Canonical decoder (spec.md §4.7, §9d): prefers the vendor's own
/// `originalPath` sidecar field when present, falling back to the naive
/// `-` -> `/` rule only when absent. Callers that need the true original
/// path MUST use this function, never [`naive_decode_project_id`] alone.
pub fn decode_project_id(project_id: &str, original_path_sidecar: Option<&str>) -> String {
    match original_path_sidecar {
        Some(original) if !original.is_empty() => original.to_string(),
        _ => naive_decode_project_id(project_id),
    }
}

/// Human-readable slug derived from a project path for display purposes
/// (spec.md §3 "ConversationManifest.projectSlug") — the final path
/// component, lowercased, with non-alphanumerics collapsed to `-`.
pub fn project_slug(project_path: &str) -> String {
    let base = Path::new(project_path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| project_path.to_string());

    let mut slug = String::with_capacity(base.len());
    let mut last_was_dash = false;
    for c in base.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_replaces_all_separators() {
        assert_eq!(encode_project_id("/Users/jane/my-project"), "-Users-jane-my-project");
    }

    #[test]
    fn naive_decode_is_lossy_for_dashed_names() {
        let encoded = encode_project_id("/Users/jane/my-project");
        // Round trip is NOT exact: "my-project" vs "my/project" are
        // indistinguishable from the encoded form alone.
        assert_eq!(naive_decode_project_id(&encoded), "/Users/jane/my/project");
    }

    #[test]
    fn canonical_decode_prefers_sidecar() {
        let encoded = encode_project_id("/Users/jane/my-project");
        let decoded = decode_project_id(&encoded, Some("/Users/jane/my-project"));
        assert_eq!(decoded, "/Users/jane/my-project");
    }

    #[test]
    fn canonical_decode_falls_back_without_sidecar() {
        let encoded = encode_project_id("/Users/jane/proj");
        let decoded = decode_project_id(&encoded, None);
        assert_eq!(decoded, naive_decode_project_id(&encoded));
    }

    #[test]
    fn project_slug_from_path() {
        assert_eq!(project_slug("/Users/jane/My Cool Project"), "my-cool-project");
    }
}
