//! Tests for deploy target selection.

use sbm_core::deploy::SelectionPolicy;
use sbm_core::types::{Target, TargetRole};

fn discovered() -> Vec<Target> {
    vec![
        Target::new("alpha-cli", TargetRole::Cli),
        Target::new("ViewerApp", TargetRole::App),
        Target::new("server", TargetRole::Unknown),
        Target::new("beta-tool", TargetRole::Cli),
    ]
}

#[test]
fn no_filters_selects_everything_in_order() {
    let selection = SelectionPolicy::new().select(&discovered());
    assert_eq!(
        selection.names(),
        vec!["alpha-cli", "ViewerApp", "server", "beta-tool"]
    );
    assert!(selection.unknown_includes.is_empty());
}

#[test]
fn include_keeps_discovery_order_and_dedups() {
    let policy = SelectionPolicy::new().with_include(["server", "alpha-cli", "server"]);
    let selection = policy.select(&discovered());
    assert_eq!(selection.names(), vec!["alpha-cli", "server"]);
}

#[test]
fn duplicate_discoveries_select_once() {
    let targets = vec![
        Target::new("alpha", TargetRole::Unknown),
        Target::new("alpha", TargetRole::Unknown),
    ];
    let selection = SelectionPolicy::new().select(&targets);
    assert_eq!(selection.names(), vec!["alpha"]);
}

#[test]
fn exclude_wins_over_include() {
    let policy = SelectionPolicy::new()
        .with_include(["alpha-cli", "server"])
        .with_exclude(["server"]);
    assert_eq!(policy.select(&discovered()).names(), vec!["alpha-cli"]);
}

#[test]
fn cli_only_limits_to_cli_targets() {
    let policy = SelectionPolicy::new().with_cli_only(true);
    assert_eq!(
        policy.select(&discovered()).names(),
        vec!["alpha-cli", "beta-tool"]
    );
}

#[test]
fn include_takes_precedence_over_cli_only() {
    let policy = SelectionPolicy::new()
        .with_cli_only(true)
        .with_include(["server"]);
    assert_eq!(policy.select(&discovered()).names(), vec!["server"]);
}

#[test]
fn keep_apps_drops_app_targets() {
    let policy = SelectionPolicy::new().with_keep_apps(true);
    assert_eq!(
        policy.select(&discovered()).names(),
        vec!["alpha-cli", "server", "beta-tool"]
    );

    // Even when named explicitly.
    let policy = SelectionPolicy::new()
        .with_keep_apps(true)
        .with_include(["ViewerApp"]);
    assert!(policy.select(&discovered()).targets.is_empty());
}

#[test]
fn unknown_includes_are_reported() {
    let policy = SelectionPolicy::new().with_include(["ghost", "alpha-cli"]);
    let selection = policy.select(&discovered());
    assert_eq!(selection.names(), vec!["alpha-cli"]);
    assert_eq!(selection.unknown_includes, vec!["ghost"]);
}

#[test]
fn excluding_everything_selects_nothing() {
    let policy = SelectionPolicy::new().with_exclude(["alpha-cli", "ViewerApp", "server", "beta-tool"]);
    let selection = policy.select(&discovered());
    assert!(selection.targets.is_empty());
}
