use std::process::Command;

fn decay_cascade() -> Command {
    Command::new(env!("CARGO_BIN_EXE_decay-cascade"))
}

#[test]
fn default_run_converges_and_exits_cleanly() {
    let output = decay_cascade()
        .args(["--no-pacing", "--seed", "7"])
        .output()
        .expect("failed to launch decay-cascade");

    assert!(output.status.success(), "default run should exit with status 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PHASE TRANSITION SUCCESSFUL"));
    assert!(!stdout.contains("PHASE TRANSITION FAILED"));
    assert!(stdout.contains("Transition Layer: 32"));
}

#[test]
fn exhausted_run_still_exits_cleanly() {
    let output = decay_cascade()
        .args(["--no-pacing", "--threshold", "0"])
        .output()
        .expect("failed to launch decay-cascade");

    assert!(output.status.success(), "exhaustion is not an error");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PHASE TRANSITION FAILED"));
    assert!(!stdout.contains("PHASE TRANSITION SUCCESSFUL"));
}

#[test]
fn stepped_config_file_is_honoured() {
    let config = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/stepped.toml");
    let output = decay_cascade()
        .args(["--no-pacing", "--config", config])
        .output()
        .expect("failed to launch decay-cascade");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Layer 30/33] "));
    assert!(!stdout.contains("[Layer 31/33] "));
    assert!(stdout.contains("Final Layer: 30"));
}

#[test]
fn invalid_configuration_exits_with_failure() {
    let output = decay_cascade()
        .args(["--no-pacing", "--stride", "0"])
        .output()
        .expect("failed to launch decay-cascade");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no report is printed for rejected configs");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("layer stride must be positive"));
}
