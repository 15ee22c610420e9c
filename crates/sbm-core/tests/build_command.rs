//! End-to-end tests for build-and-deploy runs against a fake build tool.
#![cfg(unix)]

mod support;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sbm_core::build::BuildTool;
use sbm_core::commands::{BuildCommand, BuildInvocation, BuildOptions, run_invocation};
use sbm_core::context::SbmContext;
use sbm_core::deploy::SelectionPolicy;
use sbm_core::error::SbmError;
use sbm_core::metadata::Metadata;
use sbm_core::registry::{Registry, SidecarState, render_compact};
use sbm_core::types::BuildMode;

use support::{fake_build_tool, list_names, write_package};

struct Fixture {
    _tmp: TempDir,
    root: PathBuf,
    project: PathBuf,
    dest: PathBuf,
    tool: PathBuf,
}

impl Fixture {
    fn new(targets: &[&str], exit_code: i32) -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let root = tmp.path().to_path_buf();
        let project = root.join("proj");
        let dest = root.join("bin");
        write_package(&project, "Proj", targets);
        let tool = fake_build_tool(&root, targets, exit_code);
        Self {
            _tmp: tmp,
            root,
            project,
            dest,
            tool,
        }
    }

    fn invocation(&self) -> BuildInvocation {
        BuildInvocation::new(&self.project, &self.dest)
            .with_tool(BuildTool::new(self.tool.display().to_string()))
    }

    fn context(&self) -> SbmContext {
        SbmContext::from_paths(
            self.root.join("home"),
            self.project.clone(),
            self.root.join("config"),
        )
    }
}

fn read_sidecar(dest: &Path, name: &str) -> Metadata {
    Metadata::read(&dest.join(format!("{name}.metadata"))).expect("sidecar should parse")
}

#[test]
fn builds_and_deploys_every_target() {
    let fx = Fixture::new(&["alpha", "beta"], 0);

    let mut lines = Vec::new();
    let report = run_invocation(&fx.invocation(), &mut |l| lines.push(l.text.clone()))
        .expect("run should succeed");

    assert!(report.is_success());
    assert!(report.changed());
    assert_eq!(report.selected, vec!["alpha", "beta"]);
    assert_eq!(report.package_name.as_deref(), Some("Proj"));
    assert!(lines.iter().any(|l| l == "Build complete!"));

    assert_eq!(
        list_names(&fx.dest),
        vec!["alpha", "alpha.metadata", "beta", "beta.metadata"]
    );
    assert_eq!(
        fs::read_to_string(fx.dest.join("alpha")).expect("read alpha"),
        "alpha-release\n"
    );
    let metadata = read_sidecar(&fx.dest, "beta");
    assert_eq!(metadata.build_type, Some(BuildMode::Release));
    assert_eq!(metadata.project_root.as_deref(), Some(fx.project.as_path()));
}

#[test]
fn partial_redeploy_leaves_other_targets_untouched() {
    let fx = Fixture::new(&["alpha", "beta"], 0);
    run_invocation(&fx.invocation(), &mut |_| {}).expect("release run");

    let beta_mtime = fs::metadata(fx.dest.join("beta"))
        .and_then(|m| m.modified())
        .expect("stat beta");
    let beta_sidecar = fs::read_to_string(fx.dest.join("beta.metadata")).expect("read sidecar");

    let invocation = fx
        .invocation()
        .with_mode(BuildMode::Debug)
        .with_policy(SelectionPolicy::new().with_include(["alpha"]));
    let report = run_invocation(&invocation, &mut |_| {}).expect("debug run");
    assert_eq!(report.selected, vec!["alpha"]);

    assert_eq!(
        fs::read_to_string(fx.dest.join("alpha")).expect("read alpha"),
        "alpha-debug\n"
    );
    assert_eq!(
        read_sidecar(&fx.dest, "alpha").build_type,
        Some(BuildMode::Debug)
    );

    let after = fs::metadata(fx.dest.join("beta"))
        .and_then(|m| m.modified())
        .expect("stat beta");
    assert_eq!(after, beta_mtime);
    assert_eq!(
        fs::read_to_string(fx.dest.join("beta.metadata")).expect("read sidecar"),
        beta_sidecar
    );
    assert_eq!(
        fs::read_to_string(fx.dest.join("beta")).expect("read beta"),
        "beta-release\n"
    );
    assert_eq!(
        read_sidecar(&fx.dest, "beta").build_type,
        Some(BuildMode::Release)
    );

    let snapshot = Registry::new(&fx.dest).scan();
    let beta = snapshot.get("beta").expect("beta is listed");
    match &beta.sidecar {
        SidecarState::Present { metadata } => {
            assert_eq!(metadata.build_type, Some(BuildMode::Release));
        }
        other => panic!("beta should be documented, got {other:?}"),
    }
    assert!(render_compact(&snapshot).lines().any(|l| l == "beta"));
    assert_eq!(
        snapshot.get("alpha").and_then(|e| e.metadata()).and_then(|m| m.build_type),
        Some(BuildMode::Debug)
    );
}

#[test]
fn build_failure_deploys_nothing() {
    let fx = Fixture::new(&["alpha"], 2);

    let err = run_invocation(&fx.invocation(), &mut |_| {}).unwrap_err();
    let err = err.downcast_ref::<SbmError>().expect("typed error");
    assert!(matches!(err, SbmError::BuildFailed { exit_code: 2 }));
    assert!(!fx.dest.exists());
}

#[test]
fn manifest_failure_aborts_before_building() {
    let fx = Fixture::new(&["alpha"], 0);
    fs::remove_file(fx.project.join("Package.swift")).expect("remove manifest");

    let err = run_invocation(&fx.invocation(), &mut |_| {}).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SbmError>(),
        Some(SbmError::ManifestUnreadable { .. })
    ));
    assert!(!fx.project.join(".build").exists());
    assert!(!fx.dest.exists());
}

#[test]
fn build_only_skips_manifest_and_destination() {
    let fx = Fixture::new(&["alpha"], 0);
    fs::remove_file(fx.project.join("Package.swift")).expect("remove manifest");

    let report = run_invocation(&fx.invocation().with_deploy(false), &mut |_| {})
        .expect("build-only run");
    assert!(report.deploy.is_none());
    assert!(!report.changed());
    assert!(report.is_success());
    assert!(fx.project.join(".build/release/alpha").is_file());
    assert!(!fx.dest.exists());
}

#[test]
fn unknown_and_empty_selection_warn() {
    let fx = Fixture::new(&["alpha"], 0);
    let invocation = fx
        .invocation()
        .with_policy(SelectionPolicy::new().with_include(["ghost"]));

    let report = run_invocation(&invocation, &mut |_| {}).expect("run");
    assert!(report.selected.is_empty());
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings[0].contains("ghost"));
    assert!(report.deploy.as_ref().is_some_and(|d| d.deployed.is_empty()));
}

#[test]
fn project_defaults_apply_without_flags() {
    let fx = Fixture::new(&["alpha", "beta"], 0);
    fs::write(
        fx.project.join("sbm.toml"),
        format!(
            "tool = \"{}\"\n\n[build]\nmode = \"debug\"\ntargets = [\"beta\"]\ndestination = \"out\"\n",
            fx.tool.display()
        ),
    )
    .expect("write project config");

    let ctx = fx.context();
    let invocation =
        BuildInvocation::resolve(&ctx, &BuildOptions::new()).expect("resolve invocation");
    assert_eq!(invocation.mode, BuildMode::Debug);
    assert_eq!(invocation.destination_root, fx.project.join("out"));
    assert_eq!(invocation.policy.include(), ["beta".to_string()]);
    assert!(invocation.deploy);

    let report = BuildCommand::new(ctx)
        .execute(&BuildOptions::new(), &mut |_| {})
        .expect("build command");
    assert_eq!(report.selected, vec!["beta"]);
    assert_eq!(list_names(&fx.project.join("out")), vec!["beta", "beta.metadata"]);
}

#[test]
fn flags_replace_project_defaults_entirely() {
    let fx = Fixture::new(&["alpha", "beta"], 0);
    fs::write(
        fx.project.join("sbm.toml"),
        "[build]\nmode = \"debug\"\ntargets = [\"beta\"]\ndestination = \"out\"\n",
    )
    .expect("write project config");

    let options = BuildOptions::new().with_cli_only(true);
    let invocation = BuildInvocation::resolve(&fx.context(), &options).expect("resolve");

    assert_eq!(invocation.mode, BuildMode::Release);
    assert!(invocation.policy.include().is_empty());
    assert!(invocation.policy.cli_only());
    assert_eq!(invocation.destination_root, fx.root.join("home/sbm-bin"));
}

#[test]
fn project_flag_suppresses_project_defaults() {
    let fx = Fixture::new(&["alpha", "beta"], 0);
    fs::write(
        fx.project.join("sbm.toml"),
        "[build]\nmode = \"debug\"\ntargets = [\"beta\"]\ndestination = \"out\"\n",
    )
    .expect("write project config");

    let options = BuildOptions::new().with_project(&fx.project);
    let invocation = BuildInvocation::resolve(&fx.context(), &options).expect("resolve");

    assert_eq!(invocation.project_root, fx.project);
    assert_eq!(invocation.mode, BuildMode::Release);
    assert!(invocation.policy.include().is_empty());
    assert_eq!(invocation.destination_root, fx.root.join("home/sbm-bin"));
}

#[test]
fn global_config_sets_destination_and_flags_win() {
    let fx = Fixture::new(&["alpha"], 0);
    let config_dir = fx.root.join("config");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("config.toml"), "destination = \"~/tools\"\n")
        .expect("write global config");

    let ctx = fx.context();
    let invocation = BuildInvocation::resolve(&ctx, &BuildOptions::new()).expect("resolve");
    assert_eq!(invocation.destination_root, fx.root.join("home/tools"));

    let options = BuildOptions::new()
        .with_destination("rel-bin")
        .with_map(&["alpha=~/special".to_string()]);
    let invocation = BuildInvocation::resolve(&ctx, &options).expect("resolve");
    // Relative flags are anchored at the working directory.
    assert_eq!(invocation.destination_root, fx.project.join("rel-bin"));
    assert_eq!(
        invocation.overrides.get("alpha"),
        Some(fx.root.join("home/special").as_path())
    );
}

#[test]
fn invalid_config_is_reported() {
    let fx = Fixture::new(&["alpha"], 0);
    fs::write(fx.project.join("sbm.toml"), "unknown_key = 1\n").expect("write config");

    let err = BuildInvocation::resolve(&fx.context(), &BuildOptions::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SbmError>(),
        Some(SbmError::ConfigParse { .. })
    ));
}
