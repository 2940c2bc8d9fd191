//! Tests for the binary's exit status.
//!
//! Only failures that happen before any DNS query are exercised, so these
//! tests never touch the network.

use std::process::Command;

fn email_posture() -> Command {
    Command::new(env!("CARGO_BIN_EXE_email_posture"))
}

#[test]
fn test_unreadable_selector_file_exits_with_two() {
    let output = email_posture()
        .args([
            "example.com",
            "--selector-file",
            "/nonexistent/selectors.txt",
        ])
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load DKIM selectors"), "{stderr}");
}

#[test]
fn test_blank_domain_exits_with_two() {
    let output = email_posture()
        .args(["  ", "--log-level", "error"])
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no domain given"), "{stderr}");
}

#[test]
fn test_zero_dns_attempts_exits_with_two() {
    let output = email_posture()
        .args(["example.com", "--dns-attempts", "0"])
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_domain_is_a_usage_error() {
    let output = email_posture().output().expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<DOMAIN>"), "{stderr}");
}
