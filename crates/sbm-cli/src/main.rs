//! sbm - Swift Build Manager
//!
//! Usage:
//!   sbm                    # Build in release mode and deploy all executables
//!   sbm build -d --local   # Debug build, no deployment
//!   sbm bins --detailed    # Inspect deployed binaries
//!   sbm remove alpha       # Remove a binary and its metadata
//!   sbm setup              # Create ~/sbm-bin and add it to PATH

mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sbm_core::build::OutputLine;
use sbm_core::commands::{
    BinsCommand, BinsOptions, BuildCommand, BuildOptions, CleanCommand, CleanOptions,
    RemoveCommand, RemoveOptions, SetupCommand, SetupOptions,
};
use sbm_core::error::SbmError;
use sbm_core::types::BuildMode;

#[derive(Parser)]
#[command(name = "sbm")]
#[command(about = "Build Swift packages and manage the resulting binaries", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Build flags when no subcommand is given
    #[command(flatten)]
    build: BuildArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project and deploy its executables (default)
    Build(BuildArgs),

    /// Remove deployed binaries and their metadata
    ///
    /// Without names, removes every executable target declared by the
    /// project manifest.
    #[command(alias = "rm")]
    Remove {
        /// Binary names (comma-separated or repeated)
        names: Vec<String>,
        /// Project whose targets to remove when no names are given
        #[arg(short, long)]
        project: Option<PathBuf>,
        /// Destination root (defaults to config, then ~/sbm-bin)
        #[arg(short = 'o', long)]
        destination: Option<PathBuf>,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List deployed binaries
    #[command(alias = "see-bins")]
    Bins {
        /// Destination root (defaults to config, then ~/sbm-bin)
        #[arg(short = 'o', long)]
        destination: Option<PathBuf>,
        /// Show path and metadata for each binary
        #[arg(short, long)]
        detailed: bool,
        /// Verify binaries against their recorded checksums
        #[arg(long)]
        verify: bool,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove build products of the project
    Clean {
        #[arg(short, long)]
        project: Option<PathBuf>,
    },

    /// Create the destination root and add it to PATH
    Setup {
        /// Destination root to create
        #[arg(short = 'o', long)]
        destination: Option<PathBuf>,
        /// Shell startup file to update (default: ~/.zshrc)
        #[arg(long)]
        shell_rc: Option<PathBuf>,
        /// Save the destination in the global config
        #[arg(long)]
        persist: bool,
        /// Do not touch any shell startup file
        #[arg(long)]
        no_shell: bool,
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args, Clone, Default)]
struct BuildArgs {
    /// Build in debug mode (default: release)
    #[arg(short, long)]
    debug: bool,
    /// Build only, do not deploy
    #[arg(short, long)]
    local: bool,
    /// Project directory (default: current directory)
    #[arg(short, long)]
    project: Option<PathBuf>,
    /// Destination root (defaults to config, then ~/sbm-bin)
    #[arg(short = 'o', long)]
    destination: Option<PathBuf>,
    /// Only deploy these targets (comma-separated or repeated)
    #[arg(long = "targets", value_name = "NAMES")]
    targets: Vec<String>,
    /// Never deploy these targets (comma-separated or repeated)
    #[arg(long = "skip-targets", value_name = "NAMES")]
    skip_targets: Vec<String>,
    /// Only deploy command-line targets
    #[arg(long)]
    cli_only: bool,
    /// Leave app targets out of deployment
    #[arg(long)]
    keep_apps: bool,
    /// Per-target destination (NAME=PATH, repeatable)
    #[arg(long = "map", value_name = "NAME=PATH")]
    map: Vec<String>,
    /// Output format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only show problems (non-zero exit if any)
    Quiet,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(command) => run_cli(command),
        None => run_build(cli.build),
    };
    if let Err(err) = &result
        && let Some(sbm) = err.downcast_ref::<SbmError>()
    {
        debug!(fatal = sbm.is_fatal(), error = %sbm, "Command failed");
    }
    result
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "sbm=warn",
        1 => "sbm=debug,info",
        _ => "sbm=trace,debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("SBM_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Build(args) => run_build(args),
        Commands::Remove {
            names,
            project,
            destination,
            format,
        } => run_remove(names, project, destination, format),
        Commands::Bins {
            destination,
            detailed,
            verify,
            format,
        } => run_bins(destination, detailed, verify, format),
        Commands::Clean { project } => run_clean(project),
        Commands::Setup {
            destination,
            shell_rc,
            persist,
            no_shell,
            format,
        } => run_setup(destination, shell_rc, persist, no_shell, format),
    }
}

fn build_options(args: &BuildArgs) -> BuildOptions {
    let mut options = BuildOptions::new()
        .with_targets(&args.targets)
        .with_skip_targets(&args.skip_targets)
        .with_cli_only(args.cli_only)
        .with_keep_apps(args.keep_apps)
        .with_map(&args.map)
        .with_local(args.local);
    if args.debug {
        options = options.with_mode(BuildMode::Debug);
    }
    if let Some(project) = &args.project {
        options = options.with_project(project);
    }
    if let Some(destination) = &args.destination {
        options = options.with_destination(destination);
    }
    options
}

fn run_build(args: BuildArgs) -> Result<()> {
    let options = build_options(&args);
    debug!(
        has_build_flags = options.has_build_flags(),
        mode = ?options.mode,
        "Starting build"
    );
    let cmd = BuildCommand::with_defaults()?;
    let mut on_line = line_printer(args.format);

    let report = match cmd.execute(&options, &mut on_line) {
        Ok(report) => report,
        Err(err) => return Err(exit_on_build_failure(err, args.format)),
    };

    match args.format {
        OutputFormat::Table => output::print_build_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Quiet => output::print_build_quiet(&report),
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_clean(project: Option<PathBuf>) -> Result<()> {
    let cmd = CleanCommand::with_defaults()?;
    let options = CleanOptions { project };
    let mut on_line = line_printer(OutputFormat::Table);
    match cmd.execute(&options, &mut on_line) {
        Ok(report) => {
            println!(
                "{} Cleaned {}",
                output::ok_mark(),
                report.project_root.display()
            );
            Ok(())
        }
        Err(err) => Err(exit_on_build_failure(err, OutputFormat::Table)),
    }
}

/// Stream build output: stdout for tables, stderr when stdout carries JSON.
fn line_printer(format: OutputFormat) -> impl FnMut(&OutputLine) {
    move |line: &OutputLine| match format {
        OutputFormat::Table => println!("{}", output::highlight(&line.text)),
        OutputFormat::Json => eprintln!("{}", line.text),
        OutputFormat::Quiet => {}
    }
}

// A failing build tool ends the process with its own exit code.
fn exit_on_build_failure(err: anyhow::Error, format: OutputFormat) -> anyhow::Error {
    if let Some(SbmError::BuildFailed { exit_code }) = err.downcast_ref::<SbmError>() {
        if format != OutputFormat::Json {
            eprintln!("{} {}", output::fail_mark(), err);
        } else {
            let out = serde_json::json!({ "error": err.to_string(), "exit_code": exit_code });
            println!("{out}");
        }
        let code = if *exit_code > 0 { *exit_code } else { 1 };
        debug!(tool_exit_code = *exit_code, exit_code = code, "Exiting after build failure");
        std::process::exit(code);
    }
    err
}

fn run_remove(
    names: Vec<String>,
    project: Option<PathBuf>,
    destination: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut options = RemoveOptions::new().with_names(&names);
    if let Some(project) = project {
        options = options.with_project(project);
    }
    if let Some(destination) = destination {
        options = options.with_destination(destination);
    }

    let cmd = RemoveCommand::with_defaults()?;
    let report = cmd.execute(&options)?;

    match format {
        OutputFormat::Table => output::print_remove_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Quiet => output::print_remove_quiet(&report),
    }

    if report.removal.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_bins(
    destination: Option<PathBuf>,
    detailed: bool,
    verify: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut options = BinsOptions::new().with_verify(verify);
    if let Some(destination) = destination {
        options = options.with_destination(destination);
    }

    let cmd = BinsCommand::with_defaults()?;
    let snapshot = cmd.execute(&options)?;

    match format {
        OutputFormat::Table => output::print_bins_table(&snapshot, detailed),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "schema_version": 1,
                "root": snapshot.root,
                "entries": snapshot.entries,
                "orphaned_sidecars": snapshot.orphaned_sidecars,
                "warnings": snapshot.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {
            let exit_code = output::print_bins_quiet(&snapshot);
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
    }
    Ok(())
}

fn run_setup(
    destination: Option<PathBuf>,
    shell_rc: Option<PathBuf>,
    persist: bool,
    no_shell: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut options = SetupOptions::new()
        .with_persist(persist)
        .with_skip_shell(no_shell);
    if let Some(destination) = destination {
        options = options.with_destination(destination);
    }
    if let Some(rc) = shell_rc {
        options = options.with_shell_rc(rc);
    }

    let cmd = SetupCommand::with_defaults()?;
    let report = cmd.execute(&options)?;

    match format {
        OutputFormat::Table => output::print_setup_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Quiet => {}
    }
    Ok(())
}
