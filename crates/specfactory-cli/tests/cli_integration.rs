// SPDX-License-Identifier: MIT OR Apache-2.0
//! Broader CLI integration tests: short flags, global flag validation, and
//! the `--mode`/`--log-format` enum surfaces, complementing the narrower
//! per-subcommand checks in `cli_tests.rs`.

use assert_cmd::Command;
use predicates::prelude::*;

fn specfactory() -> Command {
    Command::cargo_bin("specfactory").expect("binary `specfactory` should be built")
}

// ── Short flags ─────────────────────────────────────────────────────

#[test]
fn help_short_flag_works() {
    specfactory().arg("-h").assert().success().stdout(predicate::str::contains("run"));
}

#[test]
fn version_short_flag_works() {
    specfactory().arg("-V").assert().success().stdout(predicate::str::contains("specfactory"));
}

// ── --mode enum validation ──────────────────────────────────────────

#[test]
fn run_accepts_each_documented_mode_as_a_valid_value() {
    for mode in ["fast", "balanced", "aggressive"] {
        // Rejected for lack of a workspace, not for an unrecognized --mode value.
        let assert = specfactory()
            .args(["run", "--product-key", "mice/logitech-pro-x-superlight", "--mode", mode])
            .assert()
            .failure();
        let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
        assert!(!stderr.contains("invalid value"), "mode '{mode}' should be accepted by clap: {stderr}");
    }
}

#[test]
fn run_rejects_an_undocumented_mode() {
    specfactory()
        .args(["run", "--product-key", "mice/logitech-pro-x-superlight", "--mode", "turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ── --log-format enum validation ────────────────────────────────────

#[test]
fn log_format_accepts_pretty_and_json() {
    for format in ["pretty", "json"] {
        let assert = specfactory()
            .args(["--log-format", format, "run", "--product-key", "mice/logitech-pro-x-superlight"])
            .assert()
            .failure();
        let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
        assert!(!stderr.contains("invalid value"), "log-format '{format}' should be accepted by clap: {stderr}");
    }
}

#[test]
fn log_format_rejects_an_unknown_value() {
    specfactory()
        .args(["--log-format", "xml", "run", "--product-key", "mice/logitech-pro-x-superlight"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ── --debug flag ────────────────────────────────────────────────────

#[test]
fn debug_flag_is_accepted_alongside_a_subcommand() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let config_path = tmp.path().join("engine.toml");
    std::fs::write(&config_path, format!("workspace_dir = \"{}\"\n", tmp.path().join("data").display())).unwrap();

    specfactory()
        .args(["--debug", "--config", config_path.to_str().unwrap(), "billing-report", "--month", "2026-08"])
        .assert()
        .success();
}

// ── run-until-complete's --max-rounds must parse as u32 ─────────────

#[test]
fn run_until_complete_rejects_a_non_numeric_max_rounds() {
    specfactory()
        .args(["run-until-complete", "--product-key", "mice/logitech-pro-x-superlight", "--max-rounds", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn run_until_complete_rejects_a_negative_max_rounds() {
    specfactory()
        .args(["run-until-complete", "--product-key", "mice/logitech-pro-x-superlight", "--max-rounds", "-1"])
        .assert()
        .failure();
}
