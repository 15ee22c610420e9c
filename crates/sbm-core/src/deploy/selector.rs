//! Target selection for deployment.
//!
//! Evaluation order is fixed:
//! 1. base set: named includes, else cli targets when `cli_only`, else all
//! 2. drop app targets when `keep_apps`
//! 3. drop excludes, however a target entered the base set
//!
//! The result keeps discovery order and never repeats a name.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::{Target, TargetRole};

/// Filters applied to the discovered targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    include: Vec<String>,
    exclude: Vec<String>,
    cli_only: bool,
    keep_apps: bool,
}

impl SelectionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_cli_only(mut self, cli_only: bool) -> Self {
        self.cli_only = cli_only;
        self
    }

    /// Leave app targets out of the deploy set.
    pub fn with_keep_apps(mut self, keep_apps: bool) -> Self {
        self.keep_apps = keep_apps;
        self
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn cli_only(&self) -> bool {
        self.cli_only
    }

    pub fn keep_apps(&self) -> bool {
        self.keep_apps
    }

    /// Compute the deploy set from `discovered`.
    pub fn select(&self, discovered: &[Target]) -> Selection {
        let included = |t: &Target| {
            if !self.include.is_empty() {
                self.include.iter().any(|n| n == &t.name)
            } else if self.cli_only {
                t.role == TargetRole::Cli
            } else {
                true
            }
        };
        let kept = |t: &Target| !(self.keep_apps && t.role == TargetRole::App);
        let not_excluded = |t: &Target| !self.exclude.iter().any(|n| n == &t.name);

        let mut seen = HashSet::new();
        let targets: Vec<Target> = discovered
            .iter()
            .filter(|&t| included(t) && kept(t) && not_excluded(t))
            .filter(|t| seen.insert(t.name.clone()))
            .cloned()
            .collect();

        let unknown_includes: Vec<String> = self
            .include
            .iter()
            .filter(|n| !discovered.iter().any(|t| &t.name == *n))
            .cloned()
            .collect();
        for name in &unknown_includes {
            warn!(target_name = %name, "Requested target is not declared in the manifest");
        }
        debug!(
            discovered = discovered.len(),
            selected = targets.len(),
            "Selected targets"
        );

        Selection {
            targets,
            unknown_includes,
        }
    }
}

/// Outcome of [`SelectionPolicy::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub targets: Vec<Target>,
    /// Included names that matched no discovered target.
    pub unknown_includes: Vec<String>,
}

impl Selection {
    pub fn names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Flatten repeated, comma-separated list values. Entries are trimmed and
/// empty ones dropped.
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Per-target destination paths parsed from `name=path` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationOverrides {
    map: BTreeMap<String, PathBuf>,
}

impl DestinationOverrides {
    /// Parse `name=path` entries. An entry without exactly one `=`, or with an
    /// empty side, is dropped. A repeated name keeps its last path.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut map = BTreeMap::new();
        for entry in entries {
            let entry = entry.as_ref();
            let mut parts = entry.split('=');
            let (Some(name), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
                debug!(entry, "Dropping malformed destination override");
                continue;
            };
            let (name, path) = (name.trim(), path.trim());
            if name.is_empty() || path.is_empty() {
                debug!(entry, "Dropping malformed destination override");
                continue;
            }
            map.insert(name.to_string(), PathBuf::from(path));
        }
        Self { map }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.map.get(name).map(PathBuf::as_path)
    }

    /// Rewrite every path with `f`, e.g. to anchor relative paths.
    pub fn map_paths(self, f: impl Fn(PathBuf) -> PathBuf) -> Self {
        Self {
            map: self.map.into_iter().map(|(k, v)| (k, f(v))).collect(),
        }
    }

    /// Destination for `name`: its override, else `<root>/<name>`.
    ///
    /// An override naming an existing directory receives the binary inside it.
    pub fn resolve(&self, name: &str, root: &Path) -> PathBuf {
        match self.map.get(name) {
            Some(path) if path.is_dir() => path.join(name),
            Some(path) => path.clone(),
            None => root.join(name),
        }
    }
}
