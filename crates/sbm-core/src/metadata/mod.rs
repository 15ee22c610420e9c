//! Provenance sidecars stored next to deployed artifacts.
//!
//! A sidecar is a plain-text file named `<artifact>.metadata` holding one
//! `Key=Value` pair per line. Only the first `=` splits a line, both sides are
//! trimmed and the last occurrence of a key wins. Known keys map onto typed
//! fields; anything else (including known keys whose value does not parse) is
//! kept verbatim in [`Metadata::extra`] so hand edits survive a round trip.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{SbmError, SbmResult};
use crate::types::BuildMode;

pub const SIDECAR_SUFFIX: &str = ".metadata";

pub const KEY_PROJECT_ROOT: &str = "ProjectRootPath";
pub const KEY_BUILD_TYPE: &str = "BuildType";
pub const KEY_DEPLOYED_AT: &str = "DeployedAt";
pub const KEY_DESTINATION_ROOT: &str = "DestinationRoot";
pub const KEY_PACKAGE_NAME: &str = "PackageName";
pub const KEY_CHECKSUM: &str = "Checksum";

/// Typed view of a sidecar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub project_root: Option<PathBuf>,
    pub build_type: Option<BuildMode>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub destination_root: Option<PathBuf>,
    pub package_name: Option<String>,
    pub checksum: Option<String>,
    /// Unrecognized or unparsable pairs, preserved verbatim.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Parse sidecar text. Fails when no line yields a valid pair.
    pub fn parse(content: &str) -> Result<Self, String> {
        let pairs = parse_pairs(content);
        if pairs.is_empty() {
            return Err("no Key=Value pairs found".to_string());
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Read and parse the sidecar at `path`.
    pub fn read(path: &Path) -> SbmResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| SbmError::RegistryRead {
            entry: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let content = String::from_utf8(bytes).map_err(|_| SbmError::MetadataParse {
            path: path.to_path_buf(),
            reason: "content is not valid UTF-8".to_string(),
        })?;
        Self::parse(&content).map_err(|reason| SbmError::MetadataParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_pairs(pairs: BTreeMap<String, String>) -> Self {
        let mut meta = Metadata::default();
        for (key, value) in pairs {
            let consumed = match key.as_str() {
                KEY_PROJECT_ROOT if !value.is_empty() => {
                    meta.project_root = Some(PathBuf::from(&value));
                    true
                }
                KEY_BUILD_TYPE => value
                    .parse::<BuildMode>()
                    .map(|mode| meta.build_type = Some(mode))
                    .is_ok(),
                KEY_DEPLOYED_AT => DateTime::parse_from_rfc3339(&value)
                    .map(|ts| meta.deployed_at = Some(ts.with_timezone(&Utc)))
                    .is_ok(),
                KEY_DESTINATION_ROOT if !value.is_empty() => {
                    meta.destination_root = Some(PathBuf::from(&value));
                    true
                }
                KEY_PACKAGE_NAME if !value.is_empty() => {
                    meta.package_name = Some(value.clone());
                    true
                }
                KEY_CHECKSUM if !value.is_empty() => {
                    meta.checksum = Some(value.clone());
                    true
                }
                _ => false,
            };
            if !consumed {
                meta.extra.insert(key, value);
            }
        }
        meta
    }

    /// Ordered `(key, value)` pairs: known keys first, then extras by name.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(root) = &self.project_root {
            pairs.push((KEY_PROJECT_ROOT.to_string(), root.display().to_string()));
        }
        if let Some(mode) = self.build_type {
            pairs.push((KEY_BUILD_TYPE.to_string(), mode.to_string()));
        }
        if let Some(ts) = self.deployed_at {
            pairs.push((
                KEY_DEPLOYED_AT.to_string(),
                ts.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if let Some(root) = &self.destination_root {
            pairs.push((KEY_DESTINATION_ROOT.to_string(), root.display().to_string()));
        }
        if let Some(name) = &self.package_name {
            pairs.push((KEY_PACKAGE_NAME.to_string(), name.clone()));
        }
        if let Some(sum) = &self.checksum {
            pairs.push((KEY_CHECKSUM.to_string(), sum.clone()));
        }
        for (key, value) in &self.extra {
            pairs.push((key.clone(), value.clone()));
        }
        pairs
    }

    /// Render as sidecar text, one pair per line.
    pub fn render(&self) -> String {
        self.to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

/// Split sidecar text into pairs. Lines without `=` or with an empty key are
/// ignored; a repeated key keeps its last value.
pub fn parse_pairs(content: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    for line in content.split('\n') {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.insert(key.to_string(), value.trim().to_string());
    }
    pairs
}

/// `<artifact>.metadata`, next to the artifact.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    artifact.with_file_name(name)
}

/// Artifact name a sidecar filename belongs to, if it is one.
pub fn artifact_name_for_sidecar(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(SIDECAR_SUFFIX)
        .filter(|name| !name.is_empty())
}
