//! Setup command: prepare a destination root and put it on `PATH`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::config::{ConfigLayer, ConfigStore};
use crate::context::SbmContext;

pub const DEFAULT_SHELL_RC: &str = ".zshrc";

#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    pub destination: Option<PathBuf>,
    /// Shell startup file; defaults to `~/.zshrc`
    pub shell_rc: Option<PathBuf>,
    /// Record `destination` in the global config
    pub persist: bool,
    /// Only create the directory
    pub skip_shell: bool,
}

impl SetupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_shell_rc(mut self, rc: impl Into<PathBuf>) -> Self {
        self.shell_rc = Some(rc.into());
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_skip_shell(mut self, skip: bool) -> Self {
        self.skip_shell = skip;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub destination_root: PathBuf,
    pub created_destination: bool,
    pub shell_rc: Option<PathBuf>,
    pub export_line: Option<String>,
    pub shell_rc_updated: bool,
    pub config_saved: Option<PathBuf>,
}

impl SetupReport {
    pub fn changed(&self) -> bool {
        self.created_destination || self.shell_rc_updated || self.config_saved.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SetupCommand {
    ctx: SbmContext,
}

impl SetupCommand {
    pub fn new(ctx: SbmContext) -> Self {
        Self { ctx }
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(SbmContext::with_defaults()?))
    }

    pub fn execute(&self, options: &SetupOptions) -> anyhow::Result<SetupReport> {
        let destination_root = match options.destination.as_deref() {
            Some(dest) => self.ctx.absolutize(dest),
            None => self.ctx.load_config(self.ctx.cwd())?.destination,
        };

        let created_destination = !destination_root.is_dir();
        std::fs::create_dir_all(&destination_root).with_context(|| {
            format!("Failed to create destination: {}", destination_root.display())
        })?;
        if created_destination {
            info!(destination = %destination_root.display(), "Created destination");
        }

        let mut config_saved = None;
        if options.persist
            && let Some(dest) = options.destination.as_deref()
        {
            let store = ConfigStore::from_paths(
                ConfigLayer::Global,
                self.ctx.global_config_dir(),
                self.ctx.cwd(),
            );
            let mut config = store.load()?;
            let value = self.ctx.absolutize(dest).display().to_string();
            if config.destination.as_deref() != Some(value.as_str()) {
                config.destination = Some(value);
                store.save(&config)?;
                config_saved = Some(store.config_path().to_path_buf());
            }
        }

        let (shell_rc, export_line, shell_rc_updated) = if options.skip_shell {
            (None, None, false)
        } else {
            let rc = options
                .shell_rc
                .as_deref()
                .map(|p| self.ctx.absolutize(p))
                .unwrap_or_else(|| self.ctx.home_dir().join(DEFAULT_SHELL_RC));
            let line = export_line(&destination_root, self.ctx.home_dir());
            let updated = ensure_line(&rc, &line)?;
            (Some(rc), Some(line), updated)
        };

        Ok(SetupReport {
            destination_root,
            created_destination,
            shell_rc,
            export_line,
            shell_rc_updated,
            config_saved,
        })
    }
}

/// `export PATH="<root>:$PATH"`, written relative to `$HOME` when possible.
pub fn export_line(destination_root: &Path, home_dir: &Path) -> String {
    let shown = match destination_root.strip_prefix(home_dir) {
        Ok(rest) if rest.as_os_str().is_empty() => "$HOME".to_string(),
        Ok(rest) => format!("$HOME/{}", rest.display()),
        Err(_) => destination_root.display().to_string(),
    };
    format!("export PATH=\"{shown}:$PATH\"")
}

/// Append `line` to `path` unless an identical line is already there.
fn ensure_line(path: &Path, line: &str) -> anyhow::Result<bool> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    if existing.lines().any(|l| l.trim() == line) {
        return Ok(false);
    }

    crate::fs::ensure_parent_dir(path)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let prefix = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    writeln!(file, "{prefix}{line}").with_context(|| format!("Failed to write {}", path.display()))?;
    info!(file = %path.display(), "Added destination to PATH");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_line_uses_home_variable() {
        let home = Path::new("/home/u");
        assert_eq!(
            export_line(Path::new("/home/u/sbm-bin"), home),
            "export PATH=\"$HOME/sbm-bin:$PATH\""
        );
        assert_eq!(
            export_line(Path::new("/opt/bin"), home),
            "export PATH=\"/opt/bin:$PATH\""
        );
    }
}
