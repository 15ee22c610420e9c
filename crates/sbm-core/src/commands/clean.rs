//! Clean command: drop the build tool's products for a project.

use std::path::PathBuf;

use serde::Serialize;

use crate::build::{BuildExecutor, BuildOutcome, OutputLine};
use crate::context::SbmContext;

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub project: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub project_root: PathBuf,
    pub outcome: BuildOutcome,
}

#[derive(Debug, Clone)]
pub struct CleanCommand {
    ctx: SbmContext,
}

impl CleanCommand {
    pub fn new(ctx: SbmContext) -> Self {
        Self { ctx }
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(SbmContext::with_defaults()?))
    }

    pub fn execute(
        &self,
        options: &CleanOptions,
        on_line: &mut dyn FnMut(&OutputLine),
    ) -> anyhow::Result<CleanReport> {
        let project_root = self.ctx.project_root(options.project.as_deref());
        let config = self.ctx.load_config(&project_root)?;
        let outcome = BuildExecutor::new(config.tool).clean(&project_root, on_line)?;
        Ok(CleanReport {
            project_root,
            outcome,
        })
    }
}
