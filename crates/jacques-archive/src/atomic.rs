use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tempfile::NamedTempFile;

/// Serialize `value` to JSON and write it to `path` atomically: the file is
/// built in a `NamedTempFile` in the same directory, then persisted with a
/// single rename, so readers never observe a partially-written manifest,
/// conversation, or search index.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::Query(format!("path has no parent directory: {}", path.display()))
    })?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.persist(path)
        .map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Write a pre-rendered text artifact (e.g. a handoff/plan markdown file)
/// atomically, same idiom as [`atomic_write_json`].
pub fn atomic_write_text(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::Query(format!("path has no parent directory: {}", path.display()))
    })?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, content.as_bytes())?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Like [`read_json`] but returns `Ok(None)` instead of erroring when the
/// file does not exist yet (fresh archive roots, first-ever search index).
pub fn read_json_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
