//! Filesystem helpers for clip directories and atomic output placement.

use std::path::{Path, PathBuf};
use tokio::fs;

use goalreel_models::clip_position;

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, handling cross-device moves.
///
/// A plain rename is tried first. On EXDEV the file is copied next to `dst`
/// and renamed into place, so `dst` never holds a partial file.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename detected, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    // EXDEV is error code 18 on Linux/macOS
    e.raw_os_error() == Some(18)
}

/// Copy file to destination (via temp file) then delete source.
async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    // Dot prefix keeps the copy out of integer-name scans
    let tmp_name = format!(
        ".{}.tmp",
        dst.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );
    let tmp_dst = dst.with_file_name(tmp_name);

    fs::copy(src, &tmp_dst).await.map_err(|e| {
        tracing::error!(
            "Failed to copy file during cross-device move: {} -> {}: {}",
            src.display(),
            tmp_dst.display(),
            e
        );
        MediaError::from(e)
    })?;

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        return Err(MediaError::from(e));
    }

    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(
            "Failed to remove source file after cross-device move: {}: {}",
            src.display(),
            e
        );
    }

    Ok(())
}

/// Files in `dir` whose stem is a non-negative integer, sorted numerically.
///
/// Returns an empty list when the directory does not exist.
pub async fn list_numbered_files(dir: &Path) -> MediaResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut numbered = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(position) = clip_position(&path) {
            numbered.push((position, path));
        }
    }

    numbered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

/// Delete integer-named files left in `dir` by an earlier run.
pub async fn remove_numbered_files(dir: &Path) -> MediaResult<usize> {
    let stale = list_numbered_files(dir).await?;
    for path in &stale {
        fs::remove_file(path).await?;
    }
    Ok(stale.len())
}
