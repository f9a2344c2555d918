//! Source resolution: remote path, open handle, size and mtime.

use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use cloudput_transfer::resolve_destination;
use tokio::fs::File;

use crate::error::UploadError;
use crate::types::UploadTarget;

/// Resolves `source` into an [`UploadTarget`] and an open handle to it.
///
/// The destination is validated before the file is touched. A missing
/// modification time falls back to the current time.
pub async fn open_target(
    source: &Path,
    destination: Option<&str>,
) -> Result<(UploadTarget, File), UploadError> {
    let remote = resolve_destination(source, destination).map_err(UploadError::path_validation)?;

    let file = File::open(source)
        .await
        .map_err(|e| UploadError::SourceOpen {
            path: source.to_path_buf(),
            source: e,
        })?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| UploadError::SourceStat {
            path: source.to_path_buf(),
            source: e,
        })?;

    if !metadata.is_file() {
        return Err(UploadError::NotAFile(source.to_path_buf()));
    }

    let last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
        .trunc_subsecs(0);

    let target = UploadTarget {
        source: source.to_path_buf(),
        destination: remote,
        size_bytes: metadata.len() as i64,
        last_modified,
    };
    Ok((target, file))
}
