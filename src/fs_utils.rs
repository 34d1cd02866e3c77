//! Small file system helpers that attach the offending path and operation to every failure

use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

/// Longest sanitized name we produce, in characters
pub const MAX_NAME_LENGTH: usize = 100;

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F\x7F]"#).expect("valid regex"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]+").expect("valid regex"));

/// Create a directory and all of its parents
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::fs(path, "create_dir", e))
}

pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

pub async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

pub async fn read_to_string(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::fs(path, "read", e))
}

pub async fn write_string(path: &Path, contents: &str) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| Error::fs(path, "write", e))
}

/// Serialize `value` as pretty JSON and write it to `path`
pub async fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        Error::fs(
            path,
            "serialize",
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;
    write_string(path, &json).await
}

pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| Error::fs(to, "copy", e))
}

/// Remove a file; a missing file is not an error
pub async fn remove_file(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::fs(path, "remove", e)),
    }
}

/// Remove a directory tree; a missing directory is not an error
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::fs(path, "remove", e)),
    }
}

/// Write `contents` to `path` through a temporary sibling file and an atomic rename.
///
/// The temporary file is created with owner-only permissions on unix, and the
/// final file keeps them.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::fs(dir, "create", e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::fs(tmp.path(), "write", e))?;
    tmp.persist(path)
        .map_err(|e| Error::fs(path, "rename", e.error))?;

    set_owner_only(path, false)
}

/// Restrict permissions to the owner: `0700` for directories, `0600` for files
#[cfg(unix)]
pub fn set_owner_only(path: &Path, is_dir: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if is_dir { 0o700 } else { 0o600 };
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| Error::fs(path, "chmod", e))
}

#[cfg(not(unix))]
pub fn set_owner_only(_path: &Path, _is_dir: bool) -> Result<()> {
    Ok(())
}

/// Sanitize a string for use as a file or directory name.
///
/// Illegal characters are dropped, whitespace and hyphen runs become a single
/// `-`, leading/trailing `-` and `.` are trimmed and the result is capped at
/// [`MAX_NAME_LENGTH`] characters. Never returns an empty string.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let stripped = INVALID_CHARS.replace_all(name, "");
    let collapsed = SEPARATOR_RUNS.replace_all(stripped.trim(), "-");

    let capped: String = collapsed
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_NAME_LENGTH)
        .collect();
    let result = capped.trim_end_matches(|c| c == '-' || c == '.');

    if result.is_empty() {
        "untitled".to_string()
    } else {
        result.to_string()
    }
}
