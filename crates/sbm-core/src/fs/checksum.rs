//! Content checksums for deployed artifacts.
//!
//! Checksums are recorded in sidecars as `blake3:<hex>` so the algorithm can
//! change later without ambiguity.

use anyhow::Context;
use std::fs;
use std::io::Read;
use std::path::Path;

pub const CHECKSUM_PREFIX: &str = "blake3:";

/// Hash a single file, streaming its content.
///
/// # Example
/// ```no_run
/// use sbm_core::fs::checksum::hash_file;
/// use std::path::Path;
///
/// let checksum = hash_file(Path::new("/path/to/binary"))?;
/// assert!(checksum.starts_with("blake3:"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn hash_file(path: &Path) -> anyhow::Result<String> {
    let mut file =
        fs::File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{CHECKSUM_PREFIX}{}", hasher.finalize().to_hex()))
}

/// Compare a recorded checksum against the file currently on disk.
///
/// Returns `None` when the recorded value uses an unknown algorithm.
pub fn matches_checksum(path: &Path, recorded: &str) -> anyhow::Result<Option<bool>> {
    if !recorded.starts_with(CHECKSUM_PREFIX) {
        return Ok(None);
    }
    let current = hash_file(path)?;
    Ok(Some(current.eq_ignore_ascii_case(recorded.trim())))
}
