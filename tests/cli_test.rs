use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

mod common;

#[test]
fn test_decisions_emitted_as_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("requests.csv");
    common::generate_csv(
        &input,
        &[
            ["c_456", "m_001", "50.0", "USD", "idem-1"],
            ["c_456", "m_001", "150.0", "USD", "idem-2"],
            ["c_123", "m_001", "50.0", "USD", "idem-3"],
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("paynow"));
    cmd.arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""decision":"allow""#))
        .stdout(predicate::str::contains(r#""reasons":["transaction_allowed"]"#))
        .stdout(predicate::str::contains(
            r#""reasons":["amount_above_daily_threshold"]"#,
        ))
        .stdout(predicate::str::contains(r#""reasons":["recent_disputes"]"#))
        .stdout(predicate::str::contains(r#""requestId":"req_"#));
}

#[test]
fn test_idempotent_replay_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("requests.csv");
    // Same key twice: the replay must not debit again, so the third row
    // still sees 250.0 available and is allowed.
    common::generate_csv(
        &input,
        &[
            ["c_456", "m_001", "50.0", "USD", "idem-same"],
            ["c_456", "m_001", "50.0", "USD", "idem-same"],
            ["c_456", "m_001", "250.0", "USD", "idem-final"],
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("paynow"));
    cmd.arg(&input);

    let output = cmd.assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    // Byte-identical replay, including the request id.
    assert_eq!(lines[0], lines[1]);
    assert!(lines[2].contains(r#""decision":"review""#));
}

#[test]
fn test_rate_limit_gates_excess_requests() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("requests.csv");
    common::generate_bulk_csv(&input, "c_456", 8).unwrap();

    let mut cmd = Command::new(cargo_bin!("paynow"));
    cmd.arg(&input);

    let output = cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("Rate limit exceeded"));
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    // Default policy admits 5 per window; the 8 back-to-back rows exceed it.
    assert_eq!(stdout.lines().count(), 5);
}

#[test]
fn test_config_override_changes_policy() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("requests.csv");
    common::generate_csv(&input, &[["c_456", "m_001", "150.0", "USD", "idem-1"]]).unwrap();

    let config_path = dir.path().join("policy.json");
    let mut config = std::fs::File::create(&config_path).unwrap();
    write!(config, r#"{{"review_threshold": "500.0"}}"#).unwrap();
    drop(config);

    let mut cmd = Command::new(cargo_bin!("paynow"));
    cmd.arg(&input).arg("--config").arg(&config_path);

    // With the higher threshold the same payment is allowed outright.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""decision":"allow""#));
}
