use std::process::Command;

#[test]
fn short_session_exits_cleanly() {
    let output = Command::new(env!("CARGO_BIN_EXE_tower-defence"))
        .args(["--seconds", "0.5", "--idle-seconds", "0", "--tick-rate", "60"])
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to launch the tower-defence binary");

    assert!(output.status.success(), "session should exit with success");
    let log = String::from_utf8_lossy(&output.stdout);
    assert!(log.contains("session finished"));
}

#[test]
fn non_positive_duration_is_rejected() {
    let status = Command::new(env!("CARGO_BIN_EXE_tower-defence"))
        .args(["--seconds", "0"])
        .status()
        .expect("failed to launch the tower-defence binary");

    assert!(!status.success());
}
