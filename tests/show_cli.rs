//! End-to-end behavior of `termwrite show`.

mod common;

use common::{run, stderr, stdout, termwrite, Workspace};
use serde_json::json;

#[test]
fn append_then_show_json_round_trips() {
    let workspace = Workspace::create();
    let path = workspace.message_path();

    for result in ["b=2", "a=1", "b=3"] {
        let output = run(termwrite()
            .arg("append")
            .arg("--path")
            .arg(&path)
            .args(["--result", result]));
        assert!(output.status.success(), "stderr: {}", stderr(&output));
    }

    let output = run(termwrite().arg("show").arg("--path").arg(&path).arg("--json"));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let shown: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("parse show output");
    assert_eq!(
        shown,
        json!([
            {"key": "a", "value": "1", "type": "TaskRunResult"},
            {"key": "b", "value": "3", "type": "TaskRunResult"}
        ])
    );
}

#[test]
fn show_prints_key_value_lines() {
    let workspace = Workspace::create();
    let path = workspace.write(
        "termination",
        r#"[{"key":"z","value":"last"},{},{"key":"m","value":"mid"}]"#,
    );

    let output = run(termwrite().env("TERMWRITE_PATH", &path).arg("show"));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "m=mid\nz=last\n");
}

#[test]
fn show_reports_missing_file() {
    let workspace = Workspace::create();
    let path = workspace.message_path();

    let output = run(termwrite().arg("show").arg("--path").arg(&path));
    assert!(!output.status.success());
    assert!(stderr(&output).contains("show results in"), "stderr: {}", stderr(&output));
}

#[test]
fn show_rejects_invalid_json() {
    let workspace = Workspace::create();
    let path = workspace.write("termination", "not-json");

    let output = run(termwrite().arg("show").arg("--path").arg(&path));
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("parse termination message JSON"),
        "stderr: {}",
        stderr(&output)
    );
}
