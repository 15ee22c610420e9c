//! Removal of deployed artifacts and their sidecars.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::fs::remove_file_if_exists;
use crate::metadata::sidecar_path;

/// What happened to one half of an artifact/sidecar pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemovalStatus {
    Removed,
    /// Nothing to delete. Informational.
    NotFound,
    Failed { reason: String },
}

impl RemovalStatus {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemovalStatus::Removed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalOutcome {
    pub name: String,
    pub binary_path: PathBuf,
    pub binary: RemovalStatus,
    pub metadata_path: PathBuf,
    pub metadata: RemovalStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    pub outcomes: Vec<RemovalOutcome>,
}

impl RemovalReport {
    pub fn changed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.binary.is_removed() || o.metadata.is_removed())
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| {
            matches!(o.binary, RemovalStatus::Failed { .. })
                || matches!(o.metadata, RemovalStatus::Failed { .. })
        })
    }
}

/// Remove each named artifact and its sidecar from `destination_root`.
///
/// The two files are handled independently and every name is attempted.
pub fn remove_artifacts<S: AsRef<str>>(destination_root: &Path, names: &[S]) -> RemovalReport {
    let outcomes = names
        .iter()
        .map(|name| remove_one(destination_root, name.as_ref()))
        .collect();
    RemovalReport { outcomes }
}

fn remove_one(destination_root: &Path, name: &str) -> RemovalOutcome {
    let binary_path = destination_root.join(name);
    let metadata_path = sidecar_path(&binary_path);

    if let Err(reason) = validate_name(name) {
        warn!(target_name = name, reason = %reason, "Refusing to remove");
        return RemovalOutcome {
            name: name.to_string(),
            binary_path,
            binary: RemovalStatus::Failed {
                reason: reason.clone(),
            },
            metadata_path,
            metadata: RemovalStatus::Failed { reason },
        };
    }

    let binary = remove_entry(&binary_path);
    let metadata = remove_entry(&metadata_path);
    RemovalOutcome {
        name: name.to_string(),
        binary_path,
        binary,
        metadata_path,
        metadata,
    }
}

fn remove_entry(path: &Path) -> RemovalStatus {
    if path.is_dir() {
        return RemovalStatus::Failed {
            reason: format!("{} is a directory", path.display()),
        };
    }
    match remove_file_if_exists(path) {
        Ok(true) => {
            info!(path = %path.display(), "Removed");
            RemovalStatus::Removed
        }
        Ok(false) => RemovalStatus::NotFound,
        Err(err) => RemovalStatus::Failed {
            reason: err.to_string(),
        },
    }
}

// Names address files directly under the destination root.
fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("empty artifact name".to_string());
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(format!("'{name}' is not a plain artifact name"));
    }
    Ok(())
}
