//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const GLOBAL_CONFIG_FILE: &str = "config.toml";
pub const PROJECT_CONFIG_FILE: &str = "sbm.toml";
pub const APP_DIR_NAME: &str = "sbm";

/// Configuration layers, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLayer {
    Global,
    Project,
}

pub fn config_path_for_layer(layer: ConfigLayer, global_dir: &Path, project_root: &Path) -> PathBuf {
    match layer {
        ConfigLayer::Global => global_dir.join(GLOBAL_CONFIG_FILE),
        ConfigLayer::Project => project_root.join(PROJECT_CONFIG_FILE),
    }
}

/// `<config_dir>/sbm`, falling back to `~/.config/sbm`.
pub fn default_global_config_dir(home_dir: &Path) -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .unwrap_or_else(|| home_dir.join(".config").join(APP_DIR_NAME))
}

/// Expand a leading `~` against `home_dir`.
pub fn expand_tilde(raw: &str, home_dir: &Path) -> PathBuf {
    let raw = raw.trim();
    if raw == "~" {
        return home_dir.to_path_buf();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home_dir.join(rest);
    }
    PathBuf::from(raw)
}
