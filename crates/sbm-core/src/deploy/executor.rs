//! Place built binaries at their destinations and document them.
//!
//! Each target is handled on its own: a failed placement is recorded and the
//! batch moves on, and a failed sidecar write leaves the binary deployed but
//! undocumented. Neither aborts the remaining targets.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::build::build_output_path;
use crate::error::{SbmError, SbmResult};
use crate::fs::{self, Placement};
use crate::metadata::{Metadata, sidecar_path};
use crate::types::{BuildMode, Target};

use super::selector::DestinationOverrides;

#[derive(Debug, Clone, Serialize)]
pub struct DeployedArtifact {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub placement: Placement,
    /// False when the sidecar write failed.
    pub documented: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployFailure {
    pub target: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployReport {
    pub deployed: Vec<DeployedArtifact>,
    pub failures: Vec<DeployFailure>,
    pub warnings: Vec<String>,
}

impl DeployReport {
    pub fn changed(&self) -> bool {
        !self.deployed.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deploys one project's build outputs for one mode.
#[derive(Debug, Clone)]
pub struct ArtifactDeployer {
    project_root: PathBuf,
    mode: BuildMode,
    destination_root: PathBuf,
    overrides: DestinationOverrides,
    package_name: Option<String>,
}

impl ArtifactDeployer {
    pub fn new(project_root: PathBuf, mode: BuildMode, destination_root: PathBuf) -> Self {
        Self {
            project_root,
            mode,
            destination_root,
            overrides: DestinationOverrides::default(),
            package_name: None,
        }
    }

    pub fn with_overrides(mut self, overrides: DestinationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    pub fn destination_for(&self, target: &str) -> PathBuf {
        self.overrides.resolve(target, &self.destination_root)
    }

    /// Deploy `targets` in order.
    ///
    /// Fatal errors, such as an unusable destination root, are returned;
    /// per-target failures end up in the report.
    pub fn deploy(&self, targets: &[Target]) -> SbmResult<DeployReport> {
        std::fs::create_dir_all(&self.destination_root).map_err(|source| {
            SbmError::DestinationUnavailable {
                path: self.destination_root.clone(),
                source,
            }
        })?;

        let mut report = DeployReport::default();
        for target in targets {
            match self.deploy_one(&target.name, &mut report.warnings) {
                Ok(artifact) => report.deployed.push(artifact),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(target_name = %target.name, error = %err, "Deployment failed");
                    report.failures.push(DeployFailure {
                        target: target.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    fn deploy_one(&self, name: &str, warnings: &mut Vec<String>) -> SbmResult<DeployedArtifact> {
        let source = build_output_path(&self.project_root, self.mode, name);
        let destination = self.destination_for(name);

        let placement = fs::replace_file_atomic(&source, &destination).map_err(|err| {
            SbmError::ReplaceFailed {
                target: name.to_string(),
                reason: format!("{err:#}"),
            }
        })?;
        if placement == Placement::Replaced {
            info!(target_name = name, destination = %destination.display(), "Replaced existing binary");
        } else {
            info!(target_name = name, destination = %destination.display(), "Placed binary");
        }

        let checksum = match fs::hash_file(&destination) {
            Ok(sum) => Some(sum),
            Err(err) => {
                warnings.push(format!("{name}: could not checksum {}: {err:#}", destination.display()));
                None
            }
        };

        let documented = match self.write_sidecar(name, &destination, checksum.clone()) {
            Ok(()) => true,
            Err(err) => {
                warn!(target_name = name, error = %err, "Binary deployed without metadata");
                warnings.push(err.to_string());
                false
            }
        };

        Ok(DeployedArtifact {
            name: name.to_string(),
            source,
            destination,
            placement,
            documented,
            checksum,
        })
    }

    fn write_sidecar(
        &self,
        name: &str,
        destination: &Path,
        checksum: Option<String>,
    ) -> SbmResult<()> {
        let path = sidecar_path(destination);
        let metadata = Metadata {
            project_root: Some(self.project_root.clone()),
            build_type: Some(self.mode),
            deployed_at: Some(Utc::now()),
            destination_root: destination.parent().map(Path::to_path_buf),
            package_name: self.package_name.clone(),
            checksum,
            ..Metadata::default()
        };
        fs::write_file_atomic(&path, metadata.render().as_bytes()).map_err(|err| {
            SbmError::MetadataWriteFailed {
                target: name.to_string(),
                path: path.clone(),
                reason: format!("{err:#}"),
            }
        })
    }
}
