//! Tests for per-target destination overrides.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sbm_core::deploy::DestinationOverrides;

#[test]
fn unmapped_targets_use_the_root() {
    let overrides = DestinationOverrides::parse(&["alpha=/opt/tools/alpha"]);
    let root = Path::new("/dest");

    assert_eq!(
        overrides.resolve("alpha", root),
        PathBuf::from("/opt/tools/alpha")
    );
    assert_eq!(overrides.resolve("beta", root), PathBuf::from("/dest/beta"));
}

#[test]
fn malformed_entries_fall_back_to_root() {
    let overrides = DestinationOverrides::parse(&["alpha", "=/x", "beta=", "gamma=/a=b"]);
    assert_eq!(overrides, DestinationOverrides::default());

    let root = Path::new("/dest");
    for name in ["alpha", "beta", "gamma"] {
        assert_eq!(overrides.resolve(name, root), root.join(name));
    }
}

#[test]
fn last_duplicate_wins() {
    let overrides = DestinationOverrides::parse(&["alpha=/one", " alpha = /two "]);
    assert_eq!(overrides, DestinationOverrides::parse(&["alpha=/two"]));
    assert_eq!(overrides.get("alpha"), Some(Path::new("/two")));
}

#[test]
fn existing_directory_receives_the_binary() {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let tools = tmp.path().join("tools");
    fs::create_dir_all(&tools).expect("create tools dir");

    let entry = format!("alpha={}", tools.display());
    let overrides = DestinationOverrides::parse(&[entry]);
    assert_eq!(
        overrides.resolve("alpha", Path::new("/dest")),
        tools.join("alpha")
    );
}

#[test]
fn map_paths_rewrites_every_entry() {
    let overrides = DestinationOverrides::parse(&["a=rel/a", "b=/abs/b"])
        .map_paths(|p| if p.is_absolute() { p } else { Path::new("/proj").join(p) });
    assert_eq!(overrides.get("a"), Some(Path::new("/proj/rel/a")));
    assert_eq!(overrides.get("b"), Some(Path::new("/abs/b")));
}
