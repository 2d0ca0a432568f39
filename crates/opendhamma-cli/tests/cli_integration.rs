//! Integration tests for CLI behavior.
//!
//! These test the actual binary against a temporary vault registry. Commands
//! that would hit the GitHub API are avoided — fetch behavior is covered by
//! unit tests on the payload mapping in opendhamma-core.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const TEST_REGISTRY: &str = r#"
- id: tipitaka
  name: Tipitaka
  repo: opendhamma/tipitaka
  default: true
  readonly: true
  topics: [sutta]
  languages: [pli, en]
- id: notes
  name: Community Notes
  repo: opendhamma/notes
  basePath: content
  default: false
  readonly: false
"#;

/// Write a registry file into a temp dir; the TempDir must outlive the test.
fn setup_registry(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("vaults.yaml");
    fs::write(&path, contents).expect("failed to write vaults.yaml");
    (temp_dir, path)
}

fn run_opendhamma(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_opendhamma"))
        .args(args)
        .env_remove("VAULT_REGISTRY_PATH")
        .output()
        .expect("failed to run opendhamma")
}

#[test]
fn help_flag() {
    let output = run_opendhamma(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("opendhamma"));
    assert!(stdout.contains("Usage"));
}

#[test]
fn vaults_lists_registry_entries() {
    let (_tmp, registry) = setup_registry(TEST_REGISTRY);
    let output = run_opendhamma(&["--registry", registry.to_str().unwrap(), "vaults"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tipitaka (tipitaka) [default] [read-only]"));
    assert!(stdout.contains("Community Notes (notes)"));
    assert!(stdout.contains("repo: opendhamma/notes (base: content)"));
    assert!(stdout.contains("languages: pli, en"));
}

#[test]
fn vaults_with_missing_registry_fails() {
    let output = run_opendhamma(&["--registry", "/nonexistent/vaults.yaml", "vaults"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("not found"));
}

#[test]
fn vaults_with_invalid_registry_reports_every_issue() {
    let (_tmp, registry) = setup_registry(
        r#"
- id: ""
  name: Broken
  repo: not-a-repo
  default: true
  readonly: true
"#,
    );
    let output = run_opendhamma(&["--registry", registry.to_str().unwrap(), "vaults"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("vaults[0].id"));
    assert!(stderr.contains("vaults[0].repo"));
}

#[test]
fn show_with_unknown_vault_fails() {
    let (_tmp, registry) = setup_registry(TEST_REGISTRY);
    let output = run_opendhamma(&[
        "--registry",
        registry.to_str().unwrap(),
        "show",
        "no-such-vault",
        "README.md",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("vault not found in registry: no-such-vault"));
}
