use std::fs;

use insta::assert_yaml_snapshot;
use tempfile::tempdir;

use netproject::replay::{run_scenario, ReplayError, ReplayReport, Scenario};

use crate::sync_test::io_util::{scenario_path, SCENARIO_SNAPSHOTS_PATH};

/// Replays the named file from `tests/scenarios` and hands the report to
/// `callback` with snapshots pointed at `tests/scenario-snapshots`.
fn run_replay_test(name: &str, callback: impl FnOnce(ReplayReport)) {
    let _ = env_logger::try_init();

    let scenario = Scenario::load(&scenario_path(name)).unwrap();
    let report = run_scenario(&scenario).unwrap();

    let mut settings = insta::Settings::new();
    settings.set_snapshot_path(SCENARIO_SNAPSHOTS_PATH);
    settings.bind(move || callback(report));
}

#[test]
fn navigation() {
    run_replay_test("navigation", |report| {
        assert_yaml_snapshot!("navigation", report);
    });
}

#[test]
fn suspend_resume() {
    run_replay_test("suspend_resume", |report| {
        assert_yaml_snapshot!("suspend_resume", report);
    });
}

#[test]
fn detach() {
    run_replay_test("detach", |report| {
        assert_yaml_snapshot!("detach", report);
    });
}

#[test]
fn scenario_written_to_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inline.scenario.json");

    fs::write(
        &path,
        r#"{
            "targets": [{ "id": "t", "name": "Page" }],
            "steps": [
                { "step": "attach", "target": "t" },
                {
                    "step": "emit",
                    "target": "t",
                    "event": {
                        "event": "styleSheetAdded",
                        "data": { "styleSheetId": "1", "isInline": true, "origin": "inspector", "frameUrl": "http://a.com/app/index.html" }
                    }
                }
            ]
        }"#,
    )
    .unwrap();

    let report = run_scenario(&Scenario::load(&path).unwrap()).unwrap();
    assert_eq!(
        report.tree.urls(),
        vec!["inspector://a.com/app/inspector-stylesheet"]
    );
}

#[test]
fn malformed_scenario_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.scenario.json");
    fs::write(&path, r#"{ "steps": [{ "step": "teleport" }] }"#).unwrap();

    match Scenario::load(&path) {
        Err(ReplayError::MalformedScenario { path: error_path, .. }) => {
            assert_eq!(error_path, path)
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_scenario_file() {
    let dir = tempdir().unwrap();

    assert!(matches!(
        Scenario::load(&dir.path().join("missing.scenario.json")),
        Err(ReplayError::Io { .. })
    ));
}
