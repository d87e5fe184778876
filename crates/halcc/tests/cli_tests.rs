//! End-to-end integration tests for the halcc CLI.
//!
//! Each test writes a `.halc` source file to a temp directory, invokes the
//! built `halcc` binary against it, and asserts on its exit code and
//! output -- no in-process reuse of the `halc` library, to exercise the
//! binary the way a user actually runs it.

use std::process::Command;

fn halcc_bin() -> &'static str {
    env!("CARGO_BIN_EXE_halcc")
}

fn write_fixture(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

#[test]
fn check_succeeds_on_a_clean_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_fixture(dir.path(), "clean.halc", "[hello]\n$: hi\n@end\n");

    let output = Command::new(halcc_bin())
        .args(["check", file.to_str().unwrap(), "--verbose"])
        .output()
        .expect("failed to invoke halcc");

    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("top-level node"));
}

#[test]
fn check_reports_a_nonzero_exit_on_inconsistent_indentation() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_fixture(dir.path(), "bad.halc", "   [hello]\n");

    let output = Command::new(halcc_bin())
        .args(["check", file.to_str().unwrap()])
        .output()
        .expect("failed to invoke halcc");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("inconsistent file format") || stderr.contains("E-FMT-001"));
}

#[test]
fn check_reports_recoverable_diagnostics_but_still_succeeds() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file = write_fixture(dir.path(), "recoverable.halc", "[broken label\n$: next\n");

    let output = Command::new(halcc_bin())
        .args(["check", file.to_str().unwrap()])
        .output()
        .expect("failed to invoke halcc");

    assert!(output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn missing_file_reports_unable_to_open_file() {
    let output = Command::new(halcc_bin())
        .args(["check", "/nonexistent/path/does-not-exist.halc"])
        .output()
        .expect("failed to invoke halcc");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(halc_common::ErrorKind::UnableToOpenFile.exit_code()));
}
