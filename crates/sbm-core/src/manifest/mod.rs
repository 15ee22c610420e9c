//! Package manifest resolution.
//!
//! Extracts the package identifier and declared targets from `Package.swift`
//! by scanning its text. The manifest is never executed, so this is a
//! heuristic: computed names, declarations built in helper functions and
//! conditional target lists are not seen.

mod scan;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{SbmError, SbmResult};
use crate::types::{Target, TargetRole};

pub const MANIFEST_FILE: &str = "Package.swift";

static PACKAGE_DECL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bPackage\s*\(").ok());
static TARGET_DECL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\.(executableTarget|target)\s*\(").ok());
static NAME_FIELD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"\bname\s*:\s*"([^"]+)""#).ok());
static PATH_FIELD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"\bpath\s*:\s*"([^"]+)""#).ok());

// `app` also covers `application`.
const APP_MARKERS: &[&str] = &["app"];
const CLI_MARKERS: &[&str] = &["cli", "tool", "cmd"];

/// Result of scanning a manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    /// `name:` of the `Package(...)` declaration, when one was found.
    pub package_name: Option<String>,
    /// Every target declaration in source order, libraries included.
    /// Redeclared names appear once per declaration.
    pub targets: Vec<Target>,
}

impl Manifest {
    /// Scan manifest text. `path` is only recorded for error reporting.
    pub fn parse(path: impl Into<PathBuf>, source: &str) -> Self {
        let text = scan::strip_comments(source);
        let package_name = find_package_name(&text);
        let targets = find_targets(&text);
        Self {
            path: path.into(),
            package_name,
            targets,
        }
    }

    /// Targets that produce an executable, in declaration order.
    pub fn executable_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .filter(|t| t.role != TargetRole::Library)
            .cloned()
            .collect()
    }
}

pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(MANIFEST_FILE)
}

/// Read and scan the manifest of `project_root`.
pub fn read_manifest(project_root: &Path) -> SbmResult<Manifest> {
    let path = manifest_path(project_root);
    let source = std::fs::read_to_string(&path).map_err(|source| SbmError::ManifestUnreadable {
        path: path.clone(),
        source,
    })?;
    let manifest = Manifest::parse(&path, &source);
    debug!(
        manifest = %path.display(),
        package = ?manifest.package_name,
        targets = manifest.targets.len(),
        "Scanned manifest"
    );
    Ok(manifest)
}

/// Package identifier for `project_root`. Never fails: an unreadable or
/// unmatched manifest yields the directory's base name.
pub fn package_identifier(project_root: &Path) -> String {
    match read_manifest(project_root) {
        Ok(manifest) => {
            if let Some(name) = manifest.package_name {
                return name;
            }
        }
        Err(err) => warn!(error = %err, "Falling back to directory name for package identifier"),
    }
    directory_name(project_root)
}

/// Executable targets of `project_root`, in declaration order.
pub fn resolve_targets(project_root: &Path) -> SbmResult<Vec<Target>> {
    let manifest = read_manifest(project_root)?;
    let targets = manifest.executable_targets();
    if targets.is_empty() {
        return Err(SbmError::NoExecutableTargets {
            manifest: manifest.path,
        });
    }
    Ok(targets)
}

/// Role from markers anywhere in the lowercased name or path.
pub fn infer_role(name: &str, path: Option<&str>) -> TargetRole {
    let haystacks = [Some(name), path].map(|s| s.map(str::to_lowercase));
    let mentions = |markers: &[&str]| {
        haystacks
            .iter()
            .flatten()
            .any(|text| markers.iter().any(|m| text.contains(*m)))
    };
    if mentions(APP_MARKERS) {
        TargetRole::App
    } else if mentions(CLI_MARKERS) {
        TargetRole::Cli
    } else {
        TargetRole::Unknown
    }
}

fn directory_name(project_root: &Path) -> String {
    let absolute = std::path::absolute(project_root).unwrap_or_else(|_| project_root.to_path_buf());
    absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| absolute.display().to_string())
}

fn find_package_name(text: &str) -> Option<String> {
    let name_pattern = NAME_FIELD_PATTERN.as_ref()?;

    if let Some(decl) = PACKAGE_DECL_PATTERN.as_ref().and_then(|re| re.find(text)) {
        let open = decl.end() - 1;
        if let Some(end) = scan::matching_paren(text, open) {
            let args = scan::top_level_only(&text[open..end]);
            if let Some(caps) = name_pattern.captures(&args) {
                return Some(caps[1].to_string());
            }
        }
    }

    // No recognizable Package(...) call: take the first name field anywhere.
    name_pattern.captures(text).map(|caps| caps[1].to_string())
}

fn find_targets(text: &str) -> Vec<Target> {
    let (Some(decl_pattern), Some(name_pattern)) =
        (TARGET_DECL_PATTERN.as_ref(), NAME_FIELD_PATTERN.as_ref())
    else {
        return Vec::new();
    };

    let mut targets = Vec::new();
    let mut covered_until = 0usize;

    for caps in decl_pattern.captures_iter(text) {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // `.target(name:)` inside another declaration is a dependency reference.
        if whole.start() < covered_until {
            continue;
        }
        let open = whole.end() - 1;
        let Some(end) = scan::matching_paren(text, open) else {
            debug!(offset = whole.start(), "Unterminated target declaration");
            continue;
        };
        covered_until = end;

        let args = scan::top_level_only(&text[open..end]);
        let Some(name) = name_pattern.captures(&args).map(|c| c[1].to_string()) else {
            debug!(offset = whole.start(), "Target declaration without a literal name");
            continue;
        };
        let path = PATH_FIELD_PATTERN
            .as_ref()
            .and_then(|re| re.captures(&args))
            .map(|c| c[1].to_string());

        let role = if kind.as_str() == "target" {
            TargetRole::Library
        } else {
            infer_role(&name, path.as_deref())
        };
        let target = Target::new(name, role);
        targets.push(match path {
            Some(path) => target.with_path(path),
            None => target,
        });
    }

    targets
}
