//! End-to-end smoke tests for the `bss` binary over a JSON fixture directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("vehicles.json"),
        r#"[
            {"id": "v1", "bienSo": "98H-07480", "donVi": "Phương Trang"},
            {"id": "v2", "plate": "29B 12345"}
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("operators.json"),
        r#"[{"id": "o1", "tenDonVi": "Phương Trang"}]"#,
    )
    .unwrap();
    // Deliberately corrupt: the warm must survive it with drivers empty.
    fs::write(dir.path().join("drivers.json"), "{definitely not json").unwrap();
    dir
}

fn bss() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bss"))
}

#[test]
fn warm_reports_counts_and_survives_a_corrupt_collection() {
    let dir = fixture_dir();
    bss()
        .args(["warm", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vehicles\": 2"))
        .stdout(predicate::str::contains("\"drivers\": 0"))
        .stdout(predicate::str::contains("\"ready\": true"));
}

#[test]
fn search_prints_tagged_json_hits() {
    let dir = fixture_dir();
    bss()
        .args(["search", "98H 07480", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"v1\""))
        .stdout(predicate::str::contains("\"vehicle\""));
}

#[test]
fn search_with_no_hits_prints_nothing_and_exits_zero() {
    let dir = fixture_dir();
    bss()
        .args(["search", "ZZZZZZZ", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn stats_emits_one_json_line() {
    let dir = fixture_dir();
    bss()
        .args(["stats", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"operators\":1"));
}

#[test]
fn completions_cover_the_subcommands() {
    bss()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bss"));
}
