//! Integration tests for the `reposwarm` binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// The binary with a throwaway HOME and no colors.
fn reposwarm(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("reposwarm"));
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env("CI", "1")
        .env_remove("RUST_LOG")
        .current_dir(home.path());
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    reposwarm(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("local environment bootstrap"))
        .stdout(predicate::str::contains("doctor"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    reposwarm(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn new_help_lists_modes() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    reposwarm(&home)
        .args(["new", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--local"))
        .stdout(predicate::str::contains("--guide-only"))
        .stdout(predicate::str::contains("--skip"));
    Ok(())
}

#[test]
fn subcommand_is_required() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    reposwarm(&home).assert().failure();
    Ok(())
}

#[test]
fn critical_step_cannot_be_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    reposwarm(&home)
        .args(["new", "--local", "--skip", "temporal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be skipped"));
    Ok(())
}

#[test]
fn guide_only_writes_guides() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let dir = home.path().join("stack");

    reposwarm(&home)
        .args(["new", "--guide-only", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("INSTALL.md"));

    let guide = fs::read_to_string(dir.join("INSTALL.md"))?;
    assert!(guide.contains("# RepoSwarm Local Installation Guide"));
    assert!(dir.join("REPOSWARM_INSTALL.md").is_file());
    Ok(())
}

#[test]
fn new_json_reports_guide_paths() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let dir = home.path().join("stack");

    let output = reposwarm(&home)
        .args(["new", "--json", "--dir"])
        .arg(&dir)
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        report["guidePath"].as_str(),
        dir.join("INSTALL.md").to_str()
    );
    assert!(report["missing"].is_array());
    assert!(report["environment"]["os"].is_string());
    Ok(())
}

#[test]
fn doctor_json_is_machine_readable() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    let output = reposwarm(&home).args(["doctor", "--json"]).output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(report["environment"].is_object());
    assert_eq!(report["services"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn stop_with_nothing_running_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;

    reposwarm(&home)
        .args(["stop", "--dir"])
        .arg(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("not running"));
    Ok(())
}
