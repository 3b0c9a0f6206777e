use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn help_lists_countdown_options() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--duration"))
        .stdout(predicate::str::contains("--at"));
}

#[test]
fn version_is_reported() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn zero_duration_is_rejected() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.args(["--duration", "0s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duration must be > 0"));
}

#[test]
fn malformed_clock_time_is_rejected() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.args(["--at", "25:99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected HH:MM or HH:MM:SS"));
}

#[test]
fn duration_and_target_are_exclusive() {
    let mut cmd = cargo_bin_cmd!("countdown");
    cmd.args(["--duration", "5m", "--at", "12:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
