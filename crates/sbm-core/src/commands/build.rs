//! Build command implementation.
//!
//! Resolves the manifest, runs the build tool and deploys the selected
//! targets. All inputs are folded into a [`BuildInvocation`] up front; nothing
//! downstream reads flags, config or the environment again.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::build::{BuildExecutor, BuildOutcome, BuildTool, OutputLine};
use crate::config::{BuildDefaults, expand_tilde};
use crate::context::SbmContext;
use crate::deploy::{ArtifactDeployer, DeployReport, DestinationOverrides, SelectionPolicy};
use crate::manifest;
use crate::types::BuildMode;

/// Flags as given by a frontend.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub project: Option<PathBuf>,
    pub mode: Option<BuildMode>,
    pub destination: Option<PathBuf>,
    pub targets: Vec<String>,
    pub skip_targets: Vec<String>,
    pub cli_only: bool,
    pub keep_apps: bool,
    pub map: Vec<String>,
    /// Build without deploying
    pub local: bool,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_targets(mut self, targets: &[String]) -> Self {
        self.targets.extend(crate::deploy::split_list(targets));
        self
    }

    pub fn with_skip_targets(mut self, targets: &[String]) -> Self {
        self.skip_targets.extend(crate::deploy::split_list(targets));
        self
    }

    pub fn with_cli_only(mut self, cli_only: bool) -> Self {
        self.cli_only = cli_only;
        self
    }

    pub fn with_keep_apps(mut self, keep_apps: bool) -> Self {
        self.keep_apps = keep_apps;
        self
    }

    pub fn with_map(mut self, entries: &[String]) -> Self {
        self.map.extend(entries.iter().cloned());
        self
    }

    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// Any build flag was given, `--project` included.
    pub fn has_build_flags(&self) -> bool {
        self.project.is_some()
            || self.mode.is_some()
            || self.destination.is_some()
            || !self.targets.is_empty()
            || !self.skip_targets.is_empty()
            || self.cli_only
            || self.keep_apps
            || !self.map.is_empty()
            || self.local
    }
}

/// Fully resolved description of one build-and-deploy run.
#[derive(Debug, Clone)]
pub struct BuildInvocation {
    pub project_root: PathBuf,
    pub mode: BuildMode,
    pub destination_root: PathBuf,
    pub policy: SelectionPolicy,
    pub overrides: DestinationOverrides,
    pub deploy: bool,
    pub tool: BuildTool,
}

impl BuildInvocation {
    pub fn new(project_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            mode: BuildMode::default(),
            destination_root: destination_root.into(),
            policy: SelectionPolicy::default(),
            overrides: DestinationOverrides::default(),
            deploy: true,
            tool: BuildTool::default(),
        }
    }

    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_overrides(mut self, overrides: DestinationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_deploy(mut self, deploy: bool) -> Self {
        self.deploy = deploy;
        self
    }

    pub fn with_tool(mut self, tool: BuildTool) -> Self {
        self.tool = tool;
        self
    }

    /// Fold flags and configuration into an invocation.
    ///
    /// Project `[build]` defaults apply as a whole, and only when `options`
    /// carries no build flag.
    pub fn resolve(ctx: &SbmContext, options: &BuildOptions) -> anyhow::Result<Self> {
        let project_root = ctx.project_root(options.project.as_deref());
        let config = ctx.load_config(&project_root)?;

        let invocation = match (&config.build, options.has_build_flags()) {
            (Some(defaults), false) => {
                debug!(project = %project_root.display(), "Applying [build] defaults from config");
                from_defaults(ctx, &project_root, defaults, config.destination.clone())
            }
            _ => from_flags(ctx, &project_root, options, config.destination.clone()),
        };

        Ok(invocation.with_tool(config.tool))
    }
}

fn from_flags(
    ctx: &SbmContext,
    project_root: &Path,
    options: &BuildOptions,
    configured_destination: PathBuf,
) -> BuildInvocation {
    let destination = options
        .destination
        .as_deref()
        .map(|d| ctx.absolutize(d))
        .unwrap_or(configured_destination);
    let policy = SelectionPolicy::new()
        .with_include(options.targets.iter().cloned())
        .with_exclude(options.skip_targets.iter().cloned())
        .with_cli_only(options.cli_only)
        .with_keep_apps(options.keep_apps);
    let overrides = DestinationOverrides::parse(&options.map).map_paths(|p| ctx.absolutize(&p));

    BuildInvocation::new(project_root, destination)
        .with_mode(options.mode.unwrap_or_default())
        .with_policy(policy)
        .with_overrides(overrides)
        .with_deploy(!options.local)
}

// Relative paths in the project file are anchored at the project root.
fn from_defaults(
    ctx: &SbmContext,
    project_root: &Path,
    defaults: &BuildDefaults,
    configured_destination: PathBuf,
) -> BuildInvocation {
    let anchor = |raw: &Path| -> PathBuf {
        let expanded = raw
            .to_str()
            .map(|s| expand_tilde(s, ctx.home_dir()))
            .unwrap_or_else(|| raw.to_path_buf());
        if expanded.is_absolute() {
            expanded
        } else {
            project_root.join(expanded)
        }
    };

    let destination = defaults
        .destination
        .as_deref()
        .map(|d| anchor(Path::new(d)))
        .unwrap_or(configured_destination);
    let policy = SelectionPolicy::new()
        .with_include(crate::deploy::split_list(&defaults.targets))
        .with_exclude(crate::deploy::split_list(&defaults.skip_targets))
        .with_cli_only(defaults.cli_only.unwrap_or(false))
        .with_keep_apps(defaults.keep_apps.unwrap_or(false));
    let overrides = DestinationOverrides::parse(&defaults.map).map_paths(|p| anchor(&p));

    BuildInvocation::new(project_root, destination)
        .with_mode(defaults.mode.unwrap_or_default())
        .with_policy(policy)
        .with_overrides(overrides)
        .with_deploy(defaults.deploy.unwrap_or(true))
}

/// Report from a build run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub project_root: PathBuf,
    pub mode: BuildMode,
    pub build: BuildOutcome,
    /// `None` for build-only runs
    pub package_name: Option<String>,
    pub destination_root: Option<PathBuf>,
    pub selected: Vec<String>,
    pub deploy: Option<DeployReport>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn changed(&self) -> bool {
        self.deploy.as_ref().is_some_and(DeployReport::changed)
    }

    /// Build passed and no target failed to deploy.
    pub fn is_success(&self) -> bool {
        self.deploy.as_ref().is_none_or(DeployReport::is_success)
    }
}

/// Build command orchestrator
#[derive(Debug, Clone)]
pub struct BuildCommand {
    ctx: SbmContext,
}

impl BuildCommand {
    pub fn new(ctx: SbmContext) -> Self {
        Self { ctx }
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(SbmContext::with_defaults()?))
    }

    pub fn execute(
        &self,
        options: &BuildOptions,
        on_line: &mut dyn FnMut(&OutputLine),
    ) -> anyhow::Result<BuildReport> {
        let invocation = BuildInvocation::resolve(&self.ctx, options)?;
        run_invocation(&invocation, on_line)
    }
}

/// Run a resolved invocation.
///
/// Manifest and build failures return `Err` before the destination is
/// touched. Per-target deploy failures are in the report.
pub fn run_invocation(
    invocation: &BuildInvocation,
    on_line: &mut dyn FnMut(&OutputLine),
) -> anyhow::Result<BuildReport> {
    let root = &invocation.project_root;

    let targets = if invocation.deploy {
        Some(manifest::resolve_targets(root)?)
    } else {
        None
    };

    let executor = BuildExecutor::new(invocation.tool.clone());
    let build = executor.build(root, invocation.mode, on_line)?;

    let mut report = BuildReport {
        project_root: root.clone(),
        mode: invocation.mode,
        build,
        package_name: None,
        destination_root: None,
        selected: Vec::new(),
        deploy: None,
        warnings: Vec::new(),
    };

    let Some(targets) = targets else {
        info!(project = %root.display(), "Build only, skipping deployment");
        return Ok(report);
    };

    let selection = invocation.policy.select(&targets);
    for name in &selection.unknown_includes {
        report
            .warnings
            .push(format!("Target '{name}' is not declared in the manifest"));
    }
    if selection.targets.is_empty() {
        report
            .warnings
            .push("No targets selected for deployment".to_string());
    }

    let package_name = manifest::package_identifier(root);
    let deployer = ArtifactDeployer::new(
        root.clone(),
        invocation.mode,
        invocation.destination_root.clone(),
    )
    .with_overrides(invocation.overrides.clone())
    .with_package_name(package_name.clone());
    let deploy = deployer.deploy(&selection.targets)?;

    report.selected = selection.names().into_iter().map(String::from).collect();
    report.package_name = Some(package_name);
    report.destination_root = Some(invocation.destination_root.clone());
    report.warnings.extend(deploy.warnings.iter().cloned());
    report.deploy = Some(deploy);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_flag_counts_as_a_build_flag() {
        assert!(!BuildOptions::new().has_build_flags());
        assert!(BuildOptions::new().with_project("/p").has_build_flags());
        assert!(BuildOptions::new().with_local(true).has_build_flags());
        assert!(BuildOptions::new().with_mode(BuildMode::Debug).has_build_flags());
    }

    #[test]
    fn list_flags_are_split() {
        let options = BuildOptions::new().with_targets(&["a,b".to_string(), " c ".to_string()]);
        assert_eq!(options.targets, vec!["a", "b", "c"]);
    }
}
