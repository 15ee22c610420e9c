//! Configuration schema shared by both layers.
//!
//! - Global: `<config_dir>/sbm/config.toml`
//! - Project: `<project>/sbm.toml`
//!
//! Every field is optional so that a layer only states what it changes.

use serde::{Deserialize, Serialize};

use crate::types::BuildMode;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SbmConfig {
    /// Default destination root (`~` is expanded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Build tool program
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Build invocation defaults, used when no build flag is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildDefaults>,
}

/// `[build]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,

    /// Only deploy these targets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Never deploy these targets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_targets: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_apps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// `name=path` destination overrides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map: Vec<String>,

    /// `false` builds without deploying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<bool>,
}

impl SbmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(dest) = &self.destination
            && dest.trim().is_empty()
        {
            return Err("'destination' must not be empty".to_string());
        }
        if let Some(tool) = &self.tool
            && tool.trim().is_empty()
        {
            return Err("'tool' must not be empty".to_string());
        }
        if let Some(build) = &self.build
            && let Some(dest) = &build.destination
            && dest.trim().is_empty()
        {
            return Err("'build.destination' must not be empty".to_string());
        }
        Ok(())
    }
}
