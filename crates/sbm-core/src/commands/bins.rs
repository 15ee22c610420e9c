//! Bins command: list what a destination root holds.

use std::path::PathBuf;

use crate::context::SbmContext;
use crate::registry::{Registry, RegistrySnapshot, ScanOptions};

#[derive(Debug, Clone, Default)]
pub struct BinsOptions {
    pub destination: Option<PathBuf>,
    pub verify: bool,
}

impl BinsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BinsCommand {
    ctx: SbmContext,
}

impl BinsCommand {
    pub fn new(ctx: SbmContext) -> Self {
        Self { ctx }
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(SbmContext::with_defaults()?))
    }

    pub fn execute(&self, options: &BinsOptions) -> anyhow::Result<RegistrySnapshot> {
        let root = match options.destination.as_deref() {
            Some(dest) => self.ctx.absolutize(dest),
            None => self.ctx.load_config(self.ctx.cwd())?.destination,
        };
        let scan = ScanOptions::default().with_verify(options.verify);
        Ok(Registry::new(root).scan_with(scan))
    }
}
