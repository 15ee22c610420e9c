//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::config::{self, ResolvedConfig};
use crate::error::{SbmError, SbmResult};

/// Resolved directories shared by every command.
///
/// Frontends create this once and pass it to commands; tests build it from
/// temp directories with [`SbmContext::from_paths`].
#[derive(Debug, Clone)]
pub struct SbmContext {
    home_dir: PathBuf,
    cwd: PathBuf,
    global_config_dir: PathBuf,
}

impl SbmContext {
    /// Context for the current user and working directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let home_dir = require_home(dirs::home_dir())?;
        let cwd = std::env::current_dir()?;
        let global_config_dir = config::default_global_config_dir(&home_dir);
        Ok(Self::from_paths(home_dir, cwd, global_config_dir))
    }

    pub fn from_paths(home_dir: PathBuf, cwd: PathBuf, global_config_dir: PathBuf) -> Self {
        Self {
            home_dir,
            cwd,
            global_config_dir,
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn global_config_dir(&self) -> &Path {
        &self.global_config_dir
    }

    /// Anchor a user-supplied path: `~` expands to home, relative paths join cwd.
    pub fn absolutize(&self, raw: &Path) -> PathBuf {
        let expanded = match raw.to_str() {
            Some(s) => config::expand_tilde(s, &self.home_dir),
            None => raw.to_path_buf(),
        };
        if expanded.is_absolute() {
            expanded
        } else {
            self.cwd.join(expanded)
        }
    }

    /// Project root for an optional `--project` argument.
    pub fn project_root(&self, project: Option<&Path>) -> PathBuf {
        project
            .map(|p| self.absolutize(p))
            .unwrap_or_else(|| self.cwd.clone())
    }

    pub fn load_config(&self, project_root: &Path) -> SbmResult<ResolvedConfig> {
        config::load_config(&self.global_config_dir, project_root, &self.home_dir)
    }
}

fn require_home(home: Option<PathBuf>) -> SbmResult<PathBuf> {
    home.ok_or(SbmError::HomeDirUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_home_is_a_typed_error() {
        let err = require_home(None).unwrap_err();
        assert!(matches!(err, SbmError::HomeDirUnavailable));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "could not determine home directory");

        assert_eq!(
            require_home(Some(PathBuf::from("/home/u"))).unwrap(),
            PathBuf::from("/home/u")
        );
    }
}
