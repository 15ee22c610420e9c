//! Plain-text renderings of a registry snapshot.

use std::fmt::Write;

use super::{Integrity, RegistryEntry, RegistrySnapshot, SidecarState};
use crate::metadata::SIDECAR_SUFFIX;

/// Shown in place of metadata that does not exist or could not be read.
pub const NOT_AVAILABLE: &str = "not available";

/// One line per artifact: the name, annotated when the sidecar is missing or
/// unreadable.
pub fn render_compact(snapshot: &RegistrySnapshot) -> String {
    let mut out = String::new();
    for entry in &snapshot.entries {
        let _ = writeln!(out, "{}", compact_line(entry));
    }
    out
}

pub fn compact_line(entry: &RegistryEntry) -> String {
    let mut line = match &entry.sidecar {
        SidecarState::Present { .. } => entry.name.clone(),
        SidecarState::Missing => {
            format!("{} (missing {}{})", entry.name, entry.name, SIDECAR_SUFFIX)
        }
        SidecarState::Unavailable { .. } => format!("{} (metadata unavailable)", entry.name),
    };
    if let Some(integrity) = entry.integrity {
        let _ = write!(line, " [{}]", integrity_label(integrity));
    }
    line
}

/// Name, full path and every metadata pair per artifact, blank-line separated.
pub fn render_detailed(snapshot: &RegistrySnapshot) -> String {
    let mut out = String::new();
    for (i, entry) in snapshot.entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", entry.name);
        let _ = writeln!(out, "  Path: {}", entry.path.display());
        match entry.metadata() {
            Some(metadata) => {
                let _ = writeln!(out, "  Metadata:");
                for (key, value) in metadata.to_pairs() {
                    let _ = writeln!(out, "    {key}: {value}");
                }
            }
            None => {
                let _ = writeln!(out, "  Metadata: {NOT_AVAILABLE}");
            }
        }
        if let Some(integrity) = entry.integrity {
            let _ = writeln!(out, "  Integrity: {}", integrity_label(integrity));
        }
    }
    out
}

pub fn integrity_label(integrity: Integrity) -> &'static str {
    match integrity {
        Integrity::Ok => "ok",
        Integrity::Modified => "modified",
        Integrity::Unknown => "unknown",
    }
}
