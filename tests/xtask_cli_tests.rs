use std::process::{Command, Output};

fn xtask(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xtask"))
        .args(args)
        .output()
        .expect("should run xtask binary")
}

#[test]
fn xtask_without_command_prints_usage() {
    let output = xtask(&[]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"), "got:\n{stderr}");
}

#[test]
fn xtask_unknown_command_is_rejected() {
    let output = xtask(&["docker-tests"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown command: docker-tests"),
        "got:\n{stderr}"
    );
}

#[test]
fn xtask_rejects_flags_not_valid_for_command() {
    let output = xtask(&["precommit", "--with-odbc"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown option: --with-odbc"),
        "got:\n{stderr}"
    );
}
