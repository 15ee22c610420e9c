//! Remove command implementation.
//!
//! Deletes deployed binaries and their sidecars. Names come from the caller,
//! or from a project's manifest when none are given.

use std::path::PathBuf;

use serde::Serialize;

use crate::context::SbmContext;
use crate::deploy::{RemovalReport, remove_artifacts, split_list};
use crate::manifest;

/// Options for the remove command
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Artifact names; empty means "every executable target of the project"
    pub names: Vec<String>,
    pub project: Option<PathBuf>,
    pub destination: Option<PathBuf>,
}

impl RemoveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(mut self, names: &[String]) -> Self {
        self.names.extend(split_list(names));
        self
    }

    pub fn with_project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

/// Report from a remove operation
#[derive(Debug, Clone, Serialize)]
pub struct RemoveReport {
    pub destination_root: PathBuf,
    /// Names were read from the project manifest
    pub from_manifest: bool,
    #[serde(flatten)]
    pub removal: RemovalReport,
}

impl RemoveReport {
    pub fn changed(&self) -> bool {
        self.removal.changed()
    }
}

#[derive(Debug, Clone)]
pub struct RemoveCommand {
    ctx: SbmContext,
}

impl RemoveCommand {
    pub fn new(ctx: SbmContext) -> Self {
        Self { ctx }
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(SbmContext::with_defaults()?))
    }

    pub fn execute(&self, options: &RemoveOptions) -> anyhow::Result<RemoveReport> {
        let project_root = self.ctx.project_root(options.project.as_deref());
        let config = self.ctx.load_config(&project_root)?;
        let destination_root = options
            .destination
            .as_deref()
            .map(|d| self.ctx.absolutize(d))
            .unwrap_or(config.destination);

        let from_manifest = options.names.is_empty();
        let names = if from_manifest {
            let mut names: Vec<String> = manifest::resolve_targets(&project_root)?
                .into_iter()
                .map(|t| t.name)
                .collect();
            let mut seen = std::collections::HashSet::new();
            names.retain(|n| seen.insert(n.clone()));
            names
        } else {
            options.names.clone()
        };

        let removal = remove_artifacts(&destination_root, &names);
        Ok(RemoveReport {
            destination_root,
            from_manifest,
            removal,
        })
    }
}
