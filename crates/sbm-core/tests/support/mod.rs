#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sbm_core::types::BuildMode;

/// Write a `Package.swift` declaring `targets` as executable targets.
pub fn write_package(project: &Path, package: &str, targets: &[&str]) {
    let decls: Vec<String> = targets
        .iter()
        .map(|t| format!("        .executableTarget(name: \"{t}\")"))
        .collect();
    let manifest = format!(
        "// swift-tools-version:5.9\nimport PackageDescription\n\nlet package = Package(\n    name: \"{package}\",\n    targets: [\n{}\n    ]\n)\n",
        decls.join(",\n")
    );
    fs::create_dir_all(project).expect("Failed to create project dir");
    fs::write(project.join("Package.swift"), manifest).expect("Failed to write manifest");
}

/// Simulate build tool output at `.build/<mode>/<target>`.
pub fn write_build_output(project: &Path, mode: BuildMode, target: &str, content: &str) -> PathBuf {
    let path = project.join(".build").join(mode.as_str()).join(target);
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create build dir");
    fs::write(&path, content).expect("Failed to write build output");
    make_executable(&path);
    path
}

#[cfg(unix)]
pub fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to set permissions");
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) {}

/// A shell script standing in for the build tool.
///
/// Called as `<tool> build -c <mode>` it writes `<target>-<mode>` into
/// `.build/<mode>/<target>` for each target and exits with `exit_code`.
/// Called as `<tool> package clean` it removes `.build`.
#[cfg(unix)]
pub fn fake_build_tool(dir: &Path, targets: &[&str], exit_code: i32) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "package" ] && [ "$2" = "clean" ]; then
    rm -rf .build
    echo "cleaned"
    exit 0
fi
if [ "$1" != "build" ] || [ "$2" != "-c" ]; then
    echo "unexpected arguments: $*" >&2
    exit 64
fi
mode="$3"
echo "Compiling for $mode"
echo "warning: fake toolchain" >&2
if [ {exit_code} -ne 0 ]; then
    echo "error: build failed" >&2
    exit {exit_code}
fi
mkdir -p ".build/$mode"
for t in {targets}; do
    printf '%s-%s\n' "$t" "$mode" > ".build/$mode/$t"
    chmod 755 ".build/$mode/$t"
done
echo "Build complete!"
"#,
        targets = targets.join(" "),
    );
    let path = dir.join("fake-swift");
    fs::write(&path, script).expect("Failed to write fake tool");
    make_executable(&path);
    path
}

/// Names of non-hidden files directly inside `dir`, sorted.
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}
