use std::{fs, process::Command};

use tempfile::tempdir;

use crate::sync_test::io_util::{scenario_path, NETPROJECT_PATH};

#[test]
fn replay_writes_tree() {
    let dir = tempdir().unwrap();
    let output_path = dir.path().join("tree.json");

    let output = Command::new(NETPROJECT_PATH)
        .args(["--color", "never", "replay"])
        .arg(scenario_path("navigation"))
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("Couldn't start netproject");

    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let tree: serde_json::Value =
        serde_json::from_slice(&fs::read(&output_path).unwrap()).unwrap();
    let partitions = tree["partitions"].as_array().unwrap();

    assert_eq!(partitions.len(), 2);
    assert_eq!(partitions[0]["key"], "page:http://ads.com");
    assert_eq!(partitions[1]["displayName"], "b.com");
    assert_eq!(
        partitions[1]["children"][0]["entry"]["url"],
        "http://b.com/home.html"
    );

    let summary = String::from_utf8_lossy(&output.stderr);
    assert!(summary.contains("Replayed 4 events into 2 entries"), "{}", summary);
}

#[test]
fn replay_reports_missing_scenario() {
    let dir = tempdir().unwrap();

    let output = Command::new(NETPROJECT_PATH)
        .args(["--color", "never", "replay"])
        .arg(dir.path().join("nope.scenario.json"))
        .output()
        .expect("Couldn't start netproject");

    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not read scenario"), "{}", stderr);
    assert!(stderr.contains("caused by: "), "{}", stderr);
}

#[test]
fn split_prints_components() {
    let output = Command::new(NETPROJECT_PATH)
        .args(["split", "--json", "http://a.com/x/y.js?v=1", "junk"])
        .output()
        .expect("Couldn't start netproject");

    assert!(output.status.success());

    let parts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parts[0]["partitionUrl"], "http://a.com");
    assert_eq!(parts[0]["parentPath"], "x");
    assert_eq!(parts[0]["name"], "y.js?v=1");
    assert_eq!(parts[1]["partitionUrl"], "");
    assert_eq!(parts[1]["name"], "junk");
}
