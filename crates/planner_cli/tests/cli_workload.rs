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
        "consultants": [
            { "id": "c-1", "name": "Ada", "weekly_hours": 40 },
            { "id": "c-2", "name": "Grace", "weekly_hours": 20 }
        ],
        "time_entries": [
            { "consultant_id": "c-1", "hours": 9, "work_date": "2024-03-04" },
            { "consultant_id": "c-1", "hours": 9, "work_date": "2024-03-05" },
            { "consultant_id": "c-1", "hours": 9, "work_date": "2024-03-06" },
            { "consultant_id": "c-1", "hours": 9, "work_date": "2024-03-07" },
            { "consultant_id": "c-1", "hours": 9, "work_date": "2024-03-08" },
            { "consultant_id": "c-2", "hours": 17, "work_date": "2024-03-13" }
        ]
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn run(args: &[&str], snapshot: &PathBuf, config: &PathBuf) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_planner"))
        .args(args)
        .env("PLANNER_SNAPSHOT_PATH", snapshot)
        .env("PLANNER_CONFIG_PATH", config)
        .output()
        .expect("failed to run planner")
}

#[test]
fn workload_json_reports_levels_per_week() {
    let snapshot = temp_path("cli-workload.json");
    let config = temp_path("cli-workload-config.json");
    write_snapshot(&snapshot);

    let output = run(
        &["workload", "--weeks", "2", "--from", "2024-03-06", "--json"],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["weeks"][0], "2024-03-04");
    assert_eq!(report["weeks"][1], "2024-03-11");
    assert_eq!(report["rows"][0]["consultant_name"], "Ada");
    assert_eq!(report["rows"][0]["weeks"][0]["total_hours"], 45.0);
    assert_eq!(report["rows"][0]["weeks"][0]["level"], "overloaded");
    assert_eq!(report["rows"][1]["weeks"][1]["level"], "high");
}

#[test]
fn workload_threshold_override_changes_classification() {
    let snapshot = temp_path("cli-workload-override.json");
    let config = temp_path("cli-workload-override-config.json");
    write_snapshot(&snapshot);

    let output = run(
        &[
            "workload",
            "--weeks",
            "2",
            "--from",
            "2024-03-04",
            "--json",
            "--config-override",
            "thresholds.high=0.9",
        ],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rows"][1]["weeks"][1]["level"], "normal");
}

#[test]
fn workload_plain_text_lists_alerts() {
    let snapshot = temp_path("cli-workload-plain.json");
    let config = temp_path("cli-workload-plain-config.json");
    write_snapshot(&snapshot);

    let output = run(
        &["workload", "--weeks", "1", "--from", "2024-03-04"],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Week of 2024-03-04"));
    assert!(stdout.contains("45/40 overloaded"));
    assert!(stdout.contains("overloaded: Ada week of 2024-03-04"));
}

#[test]
fn workload_rejects_negative_hours() {
    let snapshot = temp_path("cli-workload-negative.json");
    let config = temp_path("cli-workload-negative-config.json");
    let content = serde_json::json!({
        "schema_version": 2,
        "consultants": [{ "id": "c-1", "name": "Ada", "weekly_hours": 40 }],
        "time_entries": [
            { "consultant_id": "c-1", "hours": -3, "work_date": "2024-03-04" }
        ]
    });
    std::fs::write(&snapshot, content.to_string()).unwrap();

    let output = run(
        &["workload", "--from", "2024-03-04"],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_entry"));
}

#[test]
fn workload_rejects_bad_override() {
    let snapshot = temp_path("cli-workload-bad-override.json");
    let config = temp_path("cli-workload-bad-override-config.json");
    write_snapshot(&snapshot);

    let output = run(
        &["workload", "--config-override", "thresholds.normal=0.95"],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("normal <= high <= overloaded"));
}

#[test]
fn workload_totals_sum_the_team_per_week() {
    let snapshot = temp_path("cli-workload-totals.json");
    let config = temp_path("cli-workload-totals-config.json");
    write_snapshot(&snapshot);

    let team = run(
        &["workload", "--weeks", "2", "--from", "2024-03-04", "--totals", "--json"],
        &snapshot,
        &config,
    );
    let grace = run(
        &[
            "workload",
            "--weeks",
            "2",
            "--from",
            "2024-03-04",
            "--totals",
            "--consultant",
            "c-2",
            "--json",
        ],
        &snapshot,
        &config,
    );
    let plain = run(
        &["workload", "--weeks", "1", "--from", "2024-03-04", "--totals"],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(team.status.success());
    let totals: serde_json::Value = serde_json::from_slice(&team.stdout).unwrap();
    assert_eq!(totals[0]["week_start"], "2024-03-04");
    assert_eq!(totals[0]["total_hours"], 45.0);
    assert_eq!(totals[1]["total_hours"], 17.0);

    assert!(grace.status.success());
    let totals: serde_json::Value = serde_json::from_slice(&grace.stdout).unwrap();
    assert_eq!(totals[0]["total_hours"], 0.0);
    assert_eq!(totals[1]["total_hours"], 17.0);

    assert!(plain.status.success());
    assert!(String::from_utf8_lossy(&plain.stdout).contains("Week of 2024-03-04"));
}

#[test]
fn workload_consultant_filter_requires_totals() {
    let snapshot = temp_path("cli-workload-filter.json");
    let config = temp_path("cli-workload-filter-config.json");
    write_snapshot(&snapshot);

    let output = run(&["workload", "--consultant", "c-2"], &snapshot, &config);
    let unknown = run(
        &["workload", "--totals", "--consultant", "c-9"],
        &snapshot,
        &config,
    );
    std::fs::remove_file(&snapshot).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("ERROR: invalid_input"));
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("consultant not found"));
}
