use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_planner");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run planner --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("workload"));
    assert!(stdout.contains("timeline"));
}

#[test]
fn cli_reports_unknown_subcommand() {
    let exe = env!("CARGO_BIN_EXE_planner");
    let output = Command::new(exe)
        .arg("bogus")
        .output()
        .expect("failed to run planner bogus");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: invalid_input"));
}
