//! Terminal rendering of command reports.

use console::{Style, style};

use sbm_core::commands::{BuildReport, RemoveReport, SetupReport};
use sbm_core::deploy::RemovalStatus;
use sbm_core::fs::Placement;
use sbm_core::registry::{self, RegistrySnapshot};

pub fn ok_mark() -> console::StyledObject<&'static str> {
    style("✓").green()
}

pub fn fail_mark() -> console::StyledObject<&'static str> {
    style("✗").red()
}

fn warn_mark() -> console::StyledObject<&'static str> {
    style("⚠").yellow()
}

/// Color recognized markers in a build output line. Purely cosmetic.
pub fn highlight(line: &str) -> String {
    let lower = line.to_ascii_lowercase();
    let painter = if line.contains("Build complete!") {
        Style::new().green()
    } else if lower.contains("error") {
        Style::new().red()
    } else if lower.contains("warning") {
        Style::new().yellow()
    } else {
        return line.to_string();
    };
    painter.apply_to(line).to_string()
}

pub fn print_build_table(report: &BuildReport) {
    println!(
        "{} Built {} ({}) in {:.1}s",
        ok_mark(),
        report.project_root.display(),
        report.mode,
        report.build.duration_ms as f64 / 1000.0
    );

    let Some(deploy) = &report.deploy else {
        println!("  Build only, nothing deployed");
        return;
    };

    if let Some(root) = &report.destination_root {
        println!("  Destination: {}", root.display());
    }
    for artifact in &deploy.deployed {
        let verb = match artifact.placement {
            Placement::Placed => "Deployed",
            Placement::Replaced => "Replaced",
        };
        println!(
            "  {} {} {} -> {}",
            ok_mark(),
            verb,
            style(&artifact.name).bold(),
            artifact.destination.display()
        );
        if !artifact.documented {
            println!("    {} deployed without metadata", warn_mark());
        }
    }
    for failure in &deploy.failures {
        println!("  {} {}", fail_mark(), failure.error);
    }
    for warning in &report.warnings {
        println!("  {} {}", warn_mark(), warning);
    }
}

pub fn print_build_quiet(report: &BuildReport) {
    if let Some(deploy) = &report.deploy {
        for failure in &deploy.failures {
            println!("{}", failure.error);
        }
    }
    for warning in &report.warnings {
        println!("{warning}");
    }
}

fn removal_line(kind: &str, name: &str, status: &RemovalStatus) -> String {
    match status {
        RemovalStatus::Removed => format!("{} Removed {kind} '{name}'", ok_mark()),
        RemovalStatus::NotFound => format!("• {} not found for '{name}'", capitalize(kind)),
        RemovalStatus::Failed { reason } => {
            format!("{} Could not remove {kind} '{name}': {reason}", fail_mark())
        }
    }
}

pub fn print_remove_table(report: &RemoveReport) {
    println!("Destination: {}", report.destination_root.display());
    if report.removal.outcomes.is_empty() {
        println!("Nothing to remove.");
        return;
    }
    for outcome in &report.removal.outcomes {
        println!("  {}", removal_line("binary", &outcome.name, &outcome.binary));
        println!("  {}", removal_line("metadata", &outcome.name, &outcome.metadata));
    }
}

pub fn print_remove_quiet(report: &RemoveReport) {
    for outcome in &report.removal.outcomes {
        for status in [&outcome.binary, &outcome.metadata] {
            if let RemovalStatus::Failed { reason } = status {
                println!("{}: {}", outcome.name, reason);
            }
        }
    }
}

pub fn print_bins_table(snapshot: &RegistrySnapshot, detailed: bool) {
    println!("Binaries in {}:", snapshot.root.display());
    if snapshot.entries.is_empty() {
        println!("  (none)");
    } else if detailed {
        for line in registry::render_detailed(snapshot).lines() {
            println!("  {line}");
        }
    } else {
        for entry in &snapshot.entries {
            let line = registry::view::compact_line(entry);
            if entry.metadata().is_some() {
                println!("  {line}");
            } else {
                println!("  {}", style(line).yellow());
            }
        }
    }

    if !snapshot.orphaned_sidecars.is_empty() {
        println!();
        println!("Metadata without binary:");
        for name in &snapshot.orphaned_sidecars {
            println!("  {name}");
        }
    }
    for warning in &snapshot.warnings {
        println!("{} {}", warn_mark(), warning);
    }
}

/// Report undocumented or modified binaries; non-zero when there are any.
pub fn print_bins_quiet(snapshot: &RegistrySnapshot) -> i32 {
    let issues: Vec<_> = snapshot
        .entries
        .iter()
        .filter(|e| {
            e.metadata().is_none() || e.integrity == Some(registry::Integrity::Modified)
        })
        .collect();
    for entry in &issues {
        println!("{}", registry::view::compact_line(entry));
    }
    if issues.is_empty() { 0 } else { 1 }
}

pub fn print_setup_table(report: &SetupReport) {
    if report.created_destination {
        println!(
            "{} Created {}",
            ok_mark(),
            report.destination_root.display()
        );
    } else {
        println!("• {} already exists", report.destination_root.display());
    }
    if let (Some(rc), Some(line)) = (&report.shell_rc, &report.export_line) {
        if report.shell_rc_updated {
            println!("{} Added to {}: {}", ok_mark(), rc.display(), line);
            println!("  Restart your shell or run: source {}", rc.display());
        } else {
            println!("• {} already adds the destination to PATH", rc.display());
        }
    }
    if let Some(path) = &report.config_saved {
        println!("{} Saved destination to {}", ok_mark(), path.display());
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
