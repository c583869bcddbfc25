//! Smoke tests driving the compiled binary against a local fixture repo.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::FixtureRepo;

fn snipstack() -> Command {
    Command::cargo_bin("snipstack").expect("binary builds")
}

#[test]
fn list_prints_groups_stacks_and_snippets() {
    let repo = FixtureRepo::new();
    snipstack()
        .args(["list", "--repo-type", "local", "--repo-path"])
        .arg(repo.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("panos"))
        .stdout(predicate::str::contains("snippets"))
        .stdout(predicate::str::contains("dns"))
        .stdout(predicate::str::contains("address"));
}

#[test]
fn list_entries_shows_entry_names() {
    let repo = FixtureRepo::new();
    snipstack()
        .args(["list", "--entries", "--repo-type", "local", "--repo-path"])
        .arg(repo.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Outbound"))
        .stdout(predicate::str::contains("Inbound"));
}

#[test]
fn push_with_no_names_lists_instead_of_touching_a_device() {
    let repo = FixtureRepo::new();
    snipstack()
        .args(["push", "--repo-type", "local", "--repo-path"])
        .arg(repo.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("available snippets"))
        .stdout(predicate::str::contains("tag"));
}

#[test]
fn export_emits_the_record_batch_as_json() {
    let repo = FixtureRepo::new();
    let output = snipstack()
        .args(["export", "--repo-type", "local", "--repo-path"])
        .arg(repo.root())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let records: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON batch");
    let array = records.as_array().expect("an array of records");
    assert_eq!(array.len(), 5);
    assert!(array.iter().any(|r| r["type"] == "panorama"));
}

#[test]
fn list_on_a_directory_without_templates_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    snipstack()
        .args(["list", "--repo-type", "local", "--repo-path"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid snippet repository"));
}

#[test]
fn local_repo_type_requires_a_path() {
    snipstack()
        .args(["list", "--repo-type", "local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--repo-path"));
}
