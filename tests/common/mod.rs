//! Shared test helpers for rcs integration tests.
//!
//! All tests run the built binary inside temp directories, with the
//! variables the binary reads cleared so the host environment cannot leak
//! in.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Variables the binary reads, cleared for every invocation.
const CLEARED_ENV: &[&str] = &[
    "RCS_API_KEY",
    "RCS_MODEL",
    "RCS_CONFIG",
    "RCS_LOG_FORMAT",
    "RUST_LOG",
];

/// A temp working directory with the bundled sample tasks copied in.
pub fn setup_workdir() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    let tasks = dir.path().join("tasks");
    std::fs::create_dir_all(&tasks).unwrap();
    std::fs::copy(sample_tasks(), tasks.join("sample_tasks.json")).unwrap();
    dir
}

/// Path of the bundled sample task file.
pub fn sample_tasks() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tasks/sample_tasks.json")
}

/// Write `contents` to `<dir>/<name>`, returning the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

/// Run rcs in `dir` with extra environment variables.
pub fn rcs_in_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rcs"));
    cmd.args(args).current_dir(dir);
    for name in CLEARED_ENV {
        cmd.env_remove(name);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to execute rcs")
}

/// Run rcs in `dir`.
pub fn rcs_in(dir: &Path, args: &[&str]) -> Output {
    rcs_in_with_env(dir, args, &[])
}

/// Run rcs and assert it succeeds. Returns stdout as string.
pub fn rcs_ok(dir: &Path, args: &[&str]) -> String {
    let out = rcs_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "rcs {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run rcs and assert it fails. Returns stderr as string.
pub fn rcs_fails(dir: &Path, args: &[&str]) -> String {
    let out = rcs_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected rcs {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}

/// Result files written under `<dir>/<results_dir>`, sorted.
pub fn result_files(dir: &Path, results_dir: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir.join(results_dir)) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Parse a JSON file.
pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
