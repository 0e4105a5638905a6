use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/voice_session.csv")
        .arg("--config")
        .arg("tests/fixtures/fast.json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "screen,language,step,total_steps,loan_amount,remaining_balance,monthly_emi,credit_score",
        ))
        // 25000 requested, 75% outstanding, 25000 * 1.08 / 12 per month
        .stdout(predicate::str::contains("dashboard,hi,,,25000,18750,2250,720"))
        .stderr(predicate::str::contains("loan disbursed"));

    Ok(())
}

#[test]
fn test_cli_log_level_flag() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.env_remove("RUST_LOG")
        .arg("tests/fixtures/voice_session.csv")
        .arg("--config")
        .arg("tests/fixtures/fast.json")
        .arg("--log-level")
        .arg("error");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dashboard,hi"))
        .stderr(predicate::str::contains("loan disbursed").not());

    Ok(())
}

#[test]
fn test_cli_missing_config() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/voice_session.csv")
        .arg("--config")
        .arg("tests/fixtures/does_not_exist.json");

    cmd.assert().failure();
}

#[test]
fn test_cli_invalid_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = tempfile::NamedTempFile::new()?;
    std::fs::write(
        config.path(),
        r#"{"application": {"kind": "application", "steps": []}}"#,
    )?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/voice_session.csv")
        .arg("--config")
        .arg(config.path());

    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_cli_missing_script() {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/nope.csv");

    cmd.assert().failure();
}
