//! Configuration layer merging
//!
//! Project values override global values field by field. List fields are
//! replaced as a whole when the project layer sets them.

use super::schema::{BuildDefaults, SbmConfig};

pub fn merge_configs(global: SbmConfig, project: SbmConfig) -> SbmConfig {
    SbmConfig {
        destination: project.destination.or(global.destination),
        tool: project.tool.or(global.tool),
        build: match (global.build, project.build) {
            (Some(base), Some(layer)) => Some(merge_build(base, layer)),
            (base, layer) => layer.or(base),
        },
    }
}

fn merge_build(base: BuildDefaults, layer: BuildDefaults) -> BuildDefaults {
    fn list(base: Vec<String>, layer: Vec<String>) -> Vec<String> {
        if layer.is_empty() { base } else { layer }
    }

    BuildDefaults {
        mode: layer.mode.or(base.mode),
        targets: list(base.targets, layer.targets),
        skip_targets: list(base.skip_targets, layer.skip_targets),
        cli_only: layer.cli_only.or(base.cli_only),
        keep_apps: layer.keep_apps.or(base.keep_apps),
        destination: layer.destination.or(base.destination),
        map: list(base.map, layer.map),
        deploy: layer.deploy.or(base.deploy),
    }
}
