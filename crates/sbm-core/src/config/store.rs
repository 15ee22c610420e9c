//! Config store for loading and saving one configuration layer.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::paths::{ConfigLayer, config_path_for_layer};
use super::{SbmConfig, parser};
use crate::error::SbmResult;
use crate::fs::write_file_atomic;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn from_paths(layer: ConfigLayer, global_dir: &Path, project_root: &Path) -> Self {
        Self {
            config_path: config_path_for_layer(layer, global_dir, project_root),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Missing files load as an empty configuration.
    pub fn load(&self) -> SbmResult<SbmConfig> {
        if !self.config_path.exists() {
            return Ok(SbmConfig::new());
        }
        parser::parse_config(&self.config_path)
    }

    pub fn save(&self, config: &SbmConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        write_file_atomic(&self.config_path, content.as_bytes()).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }
}
