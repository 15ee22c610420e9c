//! Build tool invocation.
//!
//! The tool runs with the project root as its working directory. Its merged
//! output is handed to the caller line by line while it runs. Success means
//! an exit status of exactly zero; nothing about the output is inspected.

pub mod stream;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{SbmError, SbmResult};
use crate::types::BuildMode;

pub use stream::{OutputLine, OutputStream};

pub const DEFAULT_BUILD_TOOL: &str = "swift";
pub const BUILD_DIR: &str = ".build";

/// External build tool and how to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTool {
    program: String,
}

impl Default for BuildTool {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_TOOL)
    }
}

impl BuildTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for a build. Depends on nothing but the mode.
    pub fn build_args(&self, mode: BuildMode) -> Vec<String> {
        vec!["build".into(), "-c".into(), mode.as_str().into()]
    }

    pub fn clean_args(&self) -> Vec<String> {
        vec!["package".into(), "clean".into()]
    }
}

/// Where the tool leaves the binary for `target` when building in `mode`.
pub fn build_output_path(project_root: &Path, mode: BuildMode, target: &str) -> PathBuf {
    project_root.join(BUILD_DIR).join(mode.as_str()).join(target)
}

/// Result of a tool run that exited with status zero.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BuildExecutor {
    tool: BuildTool,
}

impl BuildExecutor {
    pub fn new(tool: BuildTool) -> Self {
        Self { tool }
    }

    pub fn tool(&self) -> &BuildTool {
        &self.tool
    }

    /// Build `project_root` in `mode`, streaming output to `on_line`.
    pub fn build(
        &self,
        project_root: &Path,
        mode: BuildMode,
        on_line: &mut dyn FnMut(&OutputLine),
    ) -> SbmResult<BuildOutcome> {
        self.run(&self.tool.build_args(mode), project_root, on_line)
    }

    /// Remove build products of `project_root`.
    pub fn clean(
        &self,
        project_root: &Path,
        on_line: &mut dyn FnMut(&OutputLine),
    ) -> SbmResult<BuildOutcome> {
        self.run(&self.tool.clean_args(), project_root, on_line)
    }

    fn run(
        &self,
        args: &[String],
        cwd: &Path,
        on_line: &mut dyn FnMut(&OutputLine),
    ) -> SbmResult<BuildOutcome> {
        let command = format!("{} {}", self.tool.program, args.join(" "));
        debug!(command = %command, cwd = %cwd.display(), "Spawning build tool");

        let start = Instant::now();
        let mut child = Command::new(&self.tool.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SbmError::BuildSpawn {
                program: self.tool.program.clone(),
                source,
            })?;

        let (mut lines, sink) = stream::LineStream::new();
        if let Some(stdout) = child.stdout.take() {
            lines.attach(&sink, OutputStream::Stdout, stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            lines.attach(&sink, OutputStream::Stderr, stderr);
        }
        drop(sink);
        lines.drain(on_line);

        let status = child.wait().map_err(|source| SbmError::BuildSpawn {
            program: self.tool.program.clone(),
            source,
        })?;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            warn!(command = %command, exit_code, "Build tool failed");
            return Err(SbmError::BuildFailed { exit_code });
        }

        info!(command = %command, duration_ms, "Build tool finished");
        Ok(BuildOutcome {
            command,
            exit_code: 0,
            duration_ms,
        })
    }
}
