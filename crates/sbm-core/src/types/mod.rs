//! Shared core types used across manifest, build and deploy layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Build configuration. Selects both the build command and the
/// `.build/<mode>` output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    #[default]
    Release,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildMode::Debug),
            "release" => Ok(BuildMode::Release),
            other => Err(format!("Unknown build mode: {other}. Use 'debug' or 'release'")),
        }
    }
}

/// Coarse classification of a target, used only by selection filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRole {
    Cli,
    App,
    Library,
    Unknown,
}

impl TargetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetRole::Cli => "cli",
            TargetRole::App => "app",
            TargetRole::Library => "library",
            TargetRole::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buildable unit declared by a package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub role: TargetRole,
    /// Custom source path from the declaration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Target {
    pub fn new(name: impl Into<String>, role: TargetRole) -> Self {
        Self {
            name: name.into(),
            role,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}
