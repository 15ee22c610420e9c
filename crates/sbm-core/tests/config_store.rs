//! Tests for loading, saving and resolving configuration layers.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use sbm_core::config::{ConfigLayer, ConfigStore, SbmConfig, load_config};
use sbm_core::error::SbmError;
use sbm_core::types::BuildMode;

#[test]
fn missing_files_resolve_to_defaults() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let home = tmp.path().join("home");

    let resolved = load_config(&tmp.path().join("config"), &tmp.path().join("proj"), &home)
        .expect("load should succeed");
    assert_eq!(resolved.destination, home.join("sbm-bin"));
    assert_eq!(resolved.tool.program(), "swift");
    assert!(resolved.build.is_none());
}

#[test]
fn save_then_load_round_trips() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = ConfigStore::from_paths(
        ConfigLayer::Global,
        &tmp.path().join("config"),
        tmp.path(),
    );

    let config = SbmConfig {
        destination: Some("/opt/sbm".into()),
        ..SbmConfig::default()
    };
    store.save(&config).expect("save should succeed");

    assert_eq!(store.config_path(), tmp.path().join("config/config.toml"));
    assert_eq!(store.load().expect("load"), config);
}

#[test]
fn project_layer_overrides_global() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let global_dir = tmp.path().join("config");
    let project = tmp.path().join("proj");
    fs::create_dir_all(&global_dir).expect("create config dir");
    fs::create_dir_all(&project).expect("create project");

    fs::write(
        global_dir.join("config.toml"),
        "destination = \"/global/bin\"\ntool = \"xcrun-swift\"\n\n[build]\nmode = \"debug\"\nskip_targets = [\"slow\"]\n",
    )
    .expect("write global");
    fs::write(
        project.join("sbm.toml"),
        "destination = \"/project/bin\"\n\n[build]\ncli_only = true\n",
    )
    .expect("write project");

    let resolved = load_config(&global_dir, &project, tmp.path()).expect("load");
    assert_eq!(resolved.destination, PathBuf::from("/project/bin"));
    assert_eq!(resolved.tool.program(), "xcrun-swift");

    let build = resolved.build.expect("build defaults");
    assert_eq!(build.mode, Some(BuildMode::Debug));
    assert_eq!(build.skip_targets, vec!["slow"]);
    assert_eq!(build.cli_only, Some(true));
}

#[test]
fn parse_errors_name_the_file() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    fs::write(tmp.path().join("sbm.toml"), "[build]\nmode = \"fast\"\n").expect("write");

    let store = ConfigStore::from_paths(ConfigLayer::Project, tmp.path(), tmp.path());
    let err = store.load().unwrap_err();
    match err {
        SbmError::ConfigParse { path, .. } => assert_eq!(path, tmp.path().join("sbm.toml")),
        other => panic!("unexpected error: {other}"),
    }
}
