//! Read-side view of a destination root.
//!
//! The registry is derived from the directory listing every time it is asked
//! for. Binaries pair with sidecars purely by name (`<name>` and
//! `<name>.metadata`). Broken sidecars degrade the entry, never the listing,
//! and nothing here writes to disk.

pub mod view;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::SbmError;
use crate::fs::checksum::matches_checksum;
use crate::metadata::{Metadata, artifact_name_for_sidecar, sidecar_path};

pub use view::{NOT_AVAILABLE, render_compact, render_detailed};

/// State of an artifact's sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SidecarState {
    Present { metadata: Metadata },
    Missing,
    /// The sidecar exists but could not be read or parsed.
    Unavailable { reason: String },
}

/// Result of comparing a binary against its recorded checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrity {
    Ok,
    Modified,
    /// No usable checksum was recorded, or the binary could not be read.
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
    pub name: String,
    pub path: PathBuf,
    pub sidecar_path: PathBuf,
    pub sidecar: SidecarState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<Integrity>,
}

impl RegistryEntry {
    /// A sidecar file exists, whether or not it parsed.
    pub fn is_documented(&self) -> bool {
        !matches!(self.sidecar, SidecarState::Missing)
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match &self.sidecar {
            SidecarState::Present { metadata } => Some(metadata),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub root: PathBuf,
    /// Artifacts sorted by name.
    pub entries: Vec<RegistryEntry>,
    /// Sidecars whose binary is absent.
    pub orphaned_sidecars: Vec<String>,
    pub warnings: Vec<String>,
}

impl RegistrySnapshot {
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn undocumented(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(|e| !e.is_documented())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Recompute checksums of documented binaries.
    pub verify: bool,
}

impl ScanOptions {
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> RegistrySnapshot {
        self.scan_with(ScanOptions::default())
    }

    pub fn scan_with(&self, options: ScanOptions) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot {
            root: self.root.clone(),
            entries: Vec::new(),
            orphaned_sidecars: Vec::new(),
            warnings: Vec::new(),
        };

        if !self.root.exists() {
            snapshot
                .warnings
                .push(format!("Destination {} does not exist", self.root.display()));
            return snapshot;
        }

        let read_dir = match std::fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(err) => {
                snapshot.warnings.push(
                    SbmError::RegistryRead {
                        entry: self.root.clone(),
                        reason: err.to_string(),
                    }
                    .to_string(),
                );
                return snapshot;
            }
        };

        let mut artifacts = Vec::new();
        let mut sidecars = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    snapshot.warnings.push(
                        SbmError::RegistryRead {
                            entry: self.root.clone(),
                            reason: err.to_string(),
                        }
                        .to_string(),
                    );
                    continue;
                }
            };
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                snapshot.warnings.push(format!(
                    "Skipping entry with non UTF-8 name: {}",
                    entry.path().display()
                ));
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                debug!(path = %path.display(), "Skipping directory in destination");
                continue;
            }
            match artifact_name_for_sidecar(name) {
                Some(owner) => sidecars.push(owner.to_string()),
                None => artifacts.push(name.to_string()),
            }
        }

        artifacts.sort();
        sidecars.sort();

        for name in &artifacts {
            let path = self.root.join(name);
            let entry = inspect_artifact(name, path, options, &mut snapshot.warnings);
            snapshot.entries.push(entry);
        }
        snapshot.orphaned_sidecars = sidecars
            .into_iter()
            .filter(|owner| artifacts.binary_search(owner).is_err())
            .collect();

        snapshot
    }
}

fn inspect_artifact(
    name: &str,
    path: PathBuf,
    options: ScanOptions,
    warnings: &mut Vec<String>,
) -> RegistryEntry {
    let sidecar_path = sidecar_path(&path);
    let sidecar = if !sidecar_path.exists() {
        SidecarState::Missing
    } else {
        match Metadata::read(&sidecar_path) {
            Ok(metadata) => SidecarState::Present { metadata },
            Err(err) => {
                warn!(artifact = name, error = %err, "Metadata unavailable");
                warnings.push(err.to_string());
                SidecarState::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    };

    let integrity = options.verify.then(|| verify(&path, &sidecar));

    RegistryEntry {
        name: name.to_string(),
        path,
        sidecar_path,
        sidecar,
        integrity,
    }
}

fn verify(path: &Path, sidecar: &SidecarState) -> Integrity {
    let SidecarState::Present { metadata } = sidecar else {
        return Integrity::Unknown;
    };
    let Some(recorded) = metadata.checksum.as_deref() else {
        return Integrity::Unknown;
    };
    match matches_checksum(path, recorded) {
        Ok(Some(true)) => Integrity::Ok,
        Ok(Some(false)) => Integrity::Modified,
        Ok(None) | Err(_) => Integrity::Unknown,
    }
}
