use std::path::Path;

use crate::TransferError;

/// Returns the final component of a local source path.
///
/// Remote paths are UTF-8, so a file name that is not is rejected rather
/// than rewritten.
pub fn base_name(source: &Path) -> Result<String, TransferError> {
    let name = source.file_name().ok_or_else(|| {
        TransferError::InvalidPath(format!("source has no file name: {}", source.display()))
    })?;
    name.to_str().map(str::to_string).ok_or_else(|| {
        TransferError::InvalidPath(format!(
            "source file name is not valid UTF-8: {}",
            source.display()
        ))
    })
}

/// Joins a file name onto a destination directory.
///
/// A single trailing `/` on `destination` is dropped first, so `"/x"` and
/// `"/x/"` produce the same result.
pub fn full_name(file_name: &str, destination: &str) -> String {
    let dir = destination.strip_suffix('/').unwrap_or(destination);
    format!("{dir}/{file_name}")
}

/// Normalizes and checks a remote file path.
///
/// - A missing leading `/` is added; one trailing `/` is removed.
/// - Rejects empty paths, the bare root, empty segments (`//`), and `.` or
///   `..` segments.
pub fn validate_remote_path(path: &str) -> Result<String, TransferError> {
    if path.trim().is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }

    if normalized == "/" {
        return Err(TransferError::InvalidPath(
            "root is not a file path".into(),
        ));
    }

    for segment in normalized[1..].split('/') {
        match segment {
            "" => {
                return Err(TransferError::InvalidPath(format!(
                    "empty path segment not allowed: {path}"
                )));
            }
            "." | ".." => {
                return Err(TransferError::InvalidPath(format!(
                    "relative segment not allowed: {path}"
                )));
            }
            _ => {}
        }
    }

    Ok(normalized)
}

/// Computes the remote path for `source`.
///
/// With a destination directory the result is
/// `full_name(base_name(source), destination)`; without one it is
/// `/` + base name. Either way the result is validated.
pub fn resolve_destination(
    source: &Path,
    destination: Option<&str>,
) -> Result<String, TransferError> {
    let name = base_name(source)?;
    let remote = match destination {
        Some(dir) => full_name(&name, dir),
        None => format!("/{name}"),
    };
    validate_remote_path(&remote)
}
