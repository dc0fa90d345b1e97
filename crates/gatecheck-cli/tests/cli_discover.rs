use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn gatecheck() -> Command {
    Command::cargo_bin("gatecheck").unwrap()
}

#[test]
fn empty_root_reports_none_and_exits_zero() {
    let root = TempDir::new().unwrap();
    gatecheck()
        .arg("discover")
        .arg("--root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("selected none"));
}

#[test]
fn missing_root_is_a_config_error() {
    let root = TempDir::new().unwrap();
    gatecheck()
        .arg("discover")
        .arg("--root")
        .arg(root.path().join("absent"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fatal:"));
}

#[test]
fn rejected_candidates_are_listed_and_serialized() {
    let root = TempDir::new().unwrap();
    let incomplete = root.path().join("run_a");
    fs::create_dir_all(&incomplete).unwrap();
    fs::write(incomplete.join("pilot_ranked_runs.json"), "{}").unwrap();
    let out = TempDir::new().unwrap();
    let json_path = out.path().join("discovery.json");

    gatecheck()
        .arg("discover")
        .arg("--root")
        .arg(root.path())
        .arg("--output-json")
        .arg(&json_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("missing files"));

    let result: serde_json::Value =
        serde_json::from_slice(&fs::read(&json_path).unwrap()).unwrap();
    assert!(result["selected"].is_null());
    assert_eq!(result["rejected"].as_array().unwrap().len(), 1);
}
