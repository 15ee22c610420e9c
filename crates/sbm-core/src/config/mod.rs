//! Configuration for destinations, the build tool and build defaults.
//!
//! Two layers are read and merged, project over global:
//! - Global: `<config_dir>/sbm/config.toml`
//! - Project: `<project>/sbm.toml`

pub mod merge;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::build::BuildTool;
use crate::error::SbmResult;

pub use merge::merge_configs;
pub use parser::{parse_config, parse_config_str, to_toml};
pub use paths::{ConfigLayer, config_path_for_layer, default_global_config_dir, expand_tilde};
pub use schema::{BuildDefaults, SbmConfig};
pub use store::ConfigStore;

/// Destination root used when no layer sets one.
pub const DEFAULT_DESTINATION: &str = "~/sbm-bin";

/// Merged configuration with defaults applied and paths expanded.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub destination: PathBuf,
    pub tool: BuildTool,
    /// Project-level `[build]` defaults after merging, if any layer set them.
    pub build: Option<BuildDefaults>,
}

/// Load both layers for `project_root` and resolve them.
pub fn load_config(
    global_dir: &Path,
    project_root: &Path,
    home_dir: &Path,
) -> SbmResult<ResolvedConfig> {
    let global = ConfigStore::from_paths(ConfigLayer::Global, global_dir, project_root);
    let project = ConfigStore::from_paths(ConfigLayer::Project, global_dir, project_root);
    let merged = merge_configs(global.load()?, project.load()?);
    debug!(
        global = %global.config_path().display(),
        project = %project.config_path().display(),
        "Loaded configuration"
    );
    Ok(resolve(merged, home_dir))
}

pub fn resolve(config: SbmConfig, home_dir: &Path) -> ResolvedConfig {
    let destination = expand_tilde(
        config.destination.as_deref().unwrap_or(DEFAULT_DESTINATION),
        home_dir,
    );
    let tool = config.tool.map(BuildTool::new).unwrap_or_default();
    ResolvedConfig {
        destination,
        tool,
        build: config.build,
    }
}
