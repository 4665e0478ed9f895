use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn prints_version() {
    Command::cargo_bin("feed-tui")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn prints_help() {
    Command::cargo_bin("feed-tui")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Feed-TUI"))
        .stdout(predicate::str::contains("--version"))
        .stdout(predicate::str::contains("--seed"));
}

#[test]
fn exports_sample_seed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seed.yaml");
    Command::cargo_bin("feed-tui")
        .unwrap()
        .arg("--export-seed")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote sample feed"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("posts:"));
    assert!(written.contains("Jordan Lee"));
}

#[test]
fn seed_flag_requires_a_path() {
    Command::cargo_bin("feed-tui")
        .unwrap()
        .arg("--seed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--seed needs a path"));
}

#[test]
fn unknown_flag_is_rejected() {
    Command::cargo_bin("feed-tui")
        .unwrap()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown argument"));
}
