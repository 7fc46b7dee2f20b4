use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("planner-{nanos}-{file_name}"))
}

fn write_snapshot(path: &PathBuf) {
    let content = serde_json::json!({
        "schema_version": 2,
        "projects": [
            {
                "id": "p-1",
                "name": "New office",
                "start_date": "2024-05-01",
                "end_date": "2024-05-02",
                "status": "planning"
            }
        ],
        "project_templates": [
            { "id": "tpl-1", "name": "Standard rollout" },
            { "id": "tpl-bad", "name": "Broken" }
        ],
        "task_templates": [
            {
                "id": "tt-build",
                "project_template_id": "tpl-1",
                "name": "Build",
                "estimated_hours": 24,
                "relative_start_day": 3,
                "relative_end_day": 5,
                "specialization": "backend"
            },
            {
                "id": "tt-plan",
                "project_template_id": "tpl-1",
                "name": "Plan",
                "estimated_hours": 8,
                "relative_start_day": 0,
                "relative_end_day": 2
            },
            {
                "id": "tt-inverted",
                "project_template_id": "tpl-bad",
                "name": "Backwards",
                "estimated_hours": 4,
                "relative_start_day": 5,
                "relative_end_day": 2
            }
        ]
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(args: &[&str], snapshot: &PathBuf) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_planner"))
        .args(args)
        .env("PLANNER_SNAPSHOT_PATH", snapshot)
        .env("PLANNER_CONFIG_PATH", temp_path("cli-template-config.json"))
        .output()
        .expect("failed to run planner")
}

#[test]
fn template_duration_counts_through_last_day() {
    let snapshot = temp_path("cli-template-duration.json");
    write_snapshot(&snapshot);

    let output = run(&["template", "duration", "tpl-1"], &snapshot);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Template tpl-1 runs for 6 days"));
}

#[test]
fn template_apply_previews_without_saving() {
    let snapshot = temp_path("cli-template-preview.json");
    write_snapshot(&snapshot);
    let before = std::fs::read_to_string(&snapshot).unwrap();

    let output = run(
        &[
            "template",
            "apply",
            "tpl-1",
            "--project",
            "p-1",
            "--start",
            "2024-01-01",
            "--json",
        ],
        &snapshot,
    );
    let after = std::fs::read_to_string(&snapshot).unwrap();
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    assert_eq!(before, after);

    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tasks[0]["template_task_id"], "tt-build");
    assert_eq!(tasks[0]["start_date"], "2024-01-04");
    assert_eq!(tasks[0]["end_date"], "2024-01-06");
    assert_eq!(tasks[0]["status"], "pending");
    assert!(tasks[0]["consultant_id"].is_null());
    assert_eq!(tasks[1]["template_task_id"], "tt-plan");
    assert_eq!(tasks[1]["start_date"], "2024-01-01");
}

#[test]
fn template_apply_save_adds_tasks_and_extends_project() {
    let snapshot = temp_path("cli-template-save.json");
    write_snapshot(&snapshot);

    let output = run(
        &["template", "apply", "tpl-1", "--project", "p-1", "--save"],
        &snapshot,
    );
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added 2 tasks to project p-1"));

    let tasks = stored["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["project_id"], "p-1");
    assert_eq!(tasks[0]["name"], "Build");
    assert_eq!(tasks[0]["start_date"], "2024-05-04");
    assert_eq!(stored["projects"][0]["end_date"], "2024-05-06");
}

#[test]
fn template_apply_rejects_inverted_range() {
    let snapshot = temp_path("cli-template-inverted.json");
    write_snapshot(&snapshot);

    let output = run(
        &["template", "apply", "tpl-bad", "--project", "p-1", "--save"],
        &snapshot,
    );
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    std::fs::remove_file(&snapshot).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_template"));
    assert!(stored["tasks"].is_null());
}

#[test]
fn template_apply_rejects_bad_start_date() {
    let snapshot = temp_path("cli-template-bad-date.json");
    write_snapshot(&snapshot);

    let output = run(
        &[
            "template", "apply", "tpl-1", "--project", "p-1", "--start", "2024-13-01",
        ],
        &snapshot,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn template_show_lists_tasks_by_start_day() {
    let snapshot = temp_path("cli-template-show.json");
    write_snapshot(&snapshot);

    let output = run(&["template", "show", "tpl-1", "--json"], &snapshot);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let overview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(overview["duration_days"], 6);
    assert_eq!(overview["tasks"][0]["id"], "tt-plan");
    assert_eq!(overview["tasks"][1]["id"], "tt-build");
}

#[test]
fn inverted_template_is_rejected_by_every_template_view() {
    let snapshot = temp_path("cli-template-inverted-views.json");
    write_snapshot(&snapshot);

    let duration = run(&["template", "duration", "tpl-bad"], &snapshot);
    let show = run(&["template", "show", "tpl-bad"], &snapshot);
    let timeline = run(&["timeline", "template", "tpl-bad"], &snapshot);
    std::fs::remove_file(&snapshot).ok();

    for output in [duration, show, timeline] {
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("ERROR: invalid_template"));
        assert!(stderr.contains("tt-inverted"));
    }
}
