//! CLI integration tests using assert_cmd.
//!
//! Each subcommand prints its result as JSON on stdout; logs go to stderr.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn primeprobe() -> Command {
    let mut cmd = Command::cargo_bin("primeprobe").unwrap();
    cmd.env_remove("PRIMEPROBE_CONFIG")
        .env_remove("MR_ROUNDS")
        .env("RUST_LOG", "warn");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

// --- Help and arg validation ---

#[test]
fn help_shows_all_subcommands() {
    primeprobe().arg("--help").assert().success().stdout(
        predicate::str::contains("kaprekar")
            .and(predicate::str::contains("repunit"))
            .and(predicate::str::contains("mersenne"))
            .and(predicate::str::contains("brocard"))
            .and(predicate::str::contains("palindromic"))
            .and(predicate::str::contains("perfect"))
            .and(predicate::str::contains("wieferich"))
            .and(predicate::str::contains("legendre"))
            .and(predicate::str::contains("oppermann"))
            .and(predicate::str::contains("serve")),
    );
}

#[test]
fn help_serve_shows_args() {
    primeprobe()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port").and(predicate::str::contains("--bind")));
}

#[test]
fn legendre_requires_n() {
    primeprobe()
        .arg("legendre")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--n"));
}

#[test]
fn legendre_rejects_non_integer_n() {
    primeprobe()
        .args(["legendre", "--n", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a decimal integer"));
}

#[test]
fn zero_mr_rounds_is_a_config_error() {
    primeprobe()
        .args(["--mr-rounds", "0", "perfect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mr_rounds"));
}

#[test]
fn missing_config_file_fails() {
    primeprobe()
        .args(["--config", "/nonexistent/primeprobe.toml", "perfect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("primeprobe.toml"));
}

// --- Searches ---

#[test]
fn repunit_prints_json() {
    let json = stdout_json(primeprobe().args(["repunit", "--start", "2", "--end", "20"]));
    assert_eq!(json["repunit_primes"][0]["n"], 2);
    assert_eq!(json["repunit_primes"][1]["n"], 19);
}

#[test]
fn mersenne_prints_json() {
    let json = stdout_json(primeprobe().args(["mersenne", "--start", "2", "--end", "8"]));
    assert_eq!(
        json["mersenne_primes"],
        serde_json::json!([
            {"p": 2, "mersenne_number": "3"},
            {"p": 3, "mersenne_number": "7"},
            {"p": 5, "mersenne_number": "31"},
            {"p": 7, "mersenne_number": "127"}
        ])
    );
}

#[test]
fn brocard_explicit_bounds() {
    let json = stdout_json(primeprobe().args(["brocard", "--start-p", "3", "--end-p", "7"]));
    assert_eq!(json["primes"], serde_json::json!(["11", "13", "17", "19"]));
}

#[test]
fn palindromic_prints_json() {
    let json = stdout_json(primeprobe().args(["palindromic", "--min-digits", "2"]));
    assert_eq!(json["palindromic_prime"], "101");
    assert_eq!(json["digits"], 3);
}

#[test]
fn palindromic_step_limit_fails() {
    primeprobe()
        .args(["palindromic", "--min-digits", "1", "--max-candidates", "1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"candidates_tested\":1"));
}

#[test]
fn palindromic_rejects_oversized_length() {
    primeprobe()
        .args(["palindromic", "--min-digits", "10000000000000", "--max-candidates", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("digit limit"));
}

#[test]
fn repunit_rejects_exponent_beyond_u32() {
    primeprobe()
        .args(["repunit", "--start", "2", "--end", "18446744073709551615"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds u32::MAX"));
}

#[test]
fn perfect_defaults_and_list() {
    let json = stdout_json(primeprobe().arg("perfect"));
    assert_eq!(json["perfect_numbers"][1]["perfect_number"], "28");
    let json = stdout_json(primeprobe().args(["perfect", "--p-values", "5,7"]));
    assert_eq!(json["perfect_numbers"][0]["perfect_number"], "496");
    assert_eq!(json["perfect_numbers"][1]["perfect_number"], "8128");
}

#[test]
fn wieferich_prints_json() {
    let json = stdout_json(primeprobe().arg("wieferich"));
    assert_eq!(json["wieferich_primes"], serde_json::json!([1093, 3511]));
}

#[test]
fn oppermann_prints_json() {
    let json = stdout_json(primeprobe().args(["oppermann", "--n", "10"]));
    assert_eq!(json["prime1"], "97");
    assert_eq!(json["prime2"], "101");
}

#[test]
fn kaprekar_prints_one_event_per_line() {
    let output = primeprobe()
        .args(["kaprekar", "--start", "1", "--end", "9"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0]["current_n"], 1);
    assert_eq!(lines[9]["found"], false);
}
