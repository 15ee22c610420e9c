//! Atomic placement of files via temp-then-rename.
//!
//! Temp files live in the destination directory so the final `rename` never
//! crosses a filesystem boundary. Their names start with `.`, which keeps them
//! out of registry listings while a write is in flight.

use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Outcome of placing a file at a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Nothing existed at the destination before.
    Placed,
    /// An existing file was swapped out.
    Replaced,
}

/// Copy `src` over `dst` so that readers see either the old or the new file.
///
/// The source is left intact and its permission bits travel with the copy.
pub fn replace_file_atomic(src: &Path, dst: &Path) -> anyhow::Result<Placement> {
    if !src.is_file() {
        anyhow::bail!("Build output not found: {}", src.display());
    }
    ensure_parent_dir(dst)?;

    let existed = dst.exists();
    if dst.is_dir() {
        anyhow::bail!("Destination is a directory: {}", dst.display());
    }

    let tmp_path = unique_temp_path(dst)?;
    if let Err(err) = fs::copy(src, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| {
            format!(
                "Failed to copy {} to temp path {}",
                src.display(),
                tmp_path.display()
            )
        });
    }

    if let Err(err) = rename_over(&tmp_path, dst) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    Ok(if existed {
        Placement::Replaced
    } else {
        Placement::Placed
    })
}

/// Write `content` to `path` through a sibling temp file.
pub fn write_file_atomic(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let tmp_path = unique_temp_path(path)?;

    let result = (|| -> anyhow::Result<()> {
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("Failed to create temp file: {}", tmp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush temp file: {}", tmp_path.display()))?;
        rename_over(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Remove a file, returning `Ok(false)` when it was already absent.
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Allocate `.<name>.tmp.<pid>[.<attempt>]` next to `dst`.
pub fn unique_temp_path(dst: &Path) -> anyhow::Result<PathBuf> {
    let parent = dst
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Destination path has no parent: {}", dst.display()))?;
    let base = dst
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Destination path has no filename: {}", dst.display()))?;

    for attempt in 0u32..1000 {
        let name = if attempt == 0 {
            format!(".{}.tmp.{}", base.to_string_lossy(), std::process::id())
        } else {
            format!(
                ".{}.tmp.{}.{}",
                base.to_string_lossy(),
                std::process::id(),
                attempt
            )
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!("Failed to allocate a unique temp path for {}", dst.display());
}

// rename(2) replaces atomically on unix; Windows refuses to overwrite.
#[cfg(not(windows))]
fn rename_over(tmp_path: &Path, dst: &Path) -> anyhow::Result<()> {
    fs::rename(tmp_path, dst).with_context(|| {
        format!(
            "Failed to move temp path {} into destination {}",
            tmp_path.display(),
            dst.display()
        )
    })
}

#[cfg(windows)]
fn rename_over(tmp_path: &Path, dst: &Path) -> anyhow::Result<()> {
    remove_file_if_exists(dst)
        .with_context(|| format!("Failed to remove existing destination: {}", dst.display()))?;
    fs::rename(tmp_path, dst).with_context(|| {
        format!(
            "Failed to move temp path {} into destination {}",
            tmp_path.display(),
            dst.display()
        )
    })
}
