//! Integration tests for sort-by-priority
//!
//! These tests feed a realistic batch of CI status records through the
//! binary, combining a rules file with command-line rules.

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper function to create a sort-by-priority command
fn sort_by_priority() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("sort-by-priority"))
}

/// A day of CI results: a mix of kali-patched, failing, stale and fresh packages
const STATUS: &str = r#"[
  {"run_id": 101, "package": "python-apt", "version": "2.7.6", "status": "pass",
   "previous_status": "pass", "date": "2024-02-29 09:13:00", "duration_seconds": 310,
   "message": "Tests passed", "last_pass_version": "2.7.6", "last_pass_date": "2024-02-29 09:13:00"},
  {"run_id": 102, "package": "ruby-rack", "version": "3.0.8-1", "status": "fail",
   "previous_status": "pass", "date": "2024-02-28 16:02:00", "duration_seconds": 95,
   "message": "Tests failed", "last_pass_version": "3.0.7-1", "last_pass_date": "2024-01-20 11:00:00"},
  {"run_id": 103, "package": "kali-menu", "version": "2023.4.7+kali1", "status": "pass",
   "previous_status": "unknown", "date": "2024-02-27 08:45:00", "duration_seconds": null,
   "message": "Tests passed", "last_pass_version": null, "last_pass_date": null},
  {"run_id": 104, "package": "zlib", "version": "1:1.3.dfsg-3", "status": "pass",
   "previous_status": "pass", "date": "2023-11-02 04:30:00", "duration_seconds": 42,
   "message": "Tests passed", "last_pass_version": "1:1.3.dfsg-3", "last_pass_date": "2023-11-02 04:30:00"},
  {"run_id": 105, "package": "rsync", "version": "3.2.7-1", "status": "neutral",
   "previous_status": "neutral", "date": "2024-02-29 22:10:00", "duration_seconds": 12,
   "message": "No tests in this package", "last_pass_version": null, "last_pass_date": null},
  {"run_id": 106, "package": "nmap", "version": "7.94+git20230807", "status": "tmpfail",
   "previous_status": "fail", "date": "2024-02-29 23:59:00", "duration_seconds": 600,
   "message": "Temporary failure", "last_pass_version": "7.93", "last_pass_date": "2024-01-05 10:00:00"}
]"#;

const RULES_TOML: &str = r#"
[[rule]]
priority = 8
expr = 'now() - strptime("{date}", "%Y-%m-%d %H:%M:%S") > days(30)'

[[rule]]
priority = 2
expr = '"{package}".startswith("r")'
"#;

/// Helper to write the rules file into a temp dir
fn write_rules(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("priorities.toml");
    fs::write(&path, RULES_TOML).expect("Failed to write rules file");
    path
}

fn command_with_rules(rules: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = sort_by_priority();
    cmd.arg("--config")
        .arg(rules)
        .args(["--now", "2024-03-01 12:00:00"])
        .args(["-r", r#"5=re.search(r"kali", "{version}")"#])
        .args(["-r", r#"4="{status}" == "fail" and "{previous_status}" in ("unknown", "pass")"#]);
    cmd
}

// =============================================================================
// End-to-end ranking
// =============================================================================

#[test]
fn test_full_ranking_with_priorities() {
    let temp = TempDir::new().unwrap();
    let rules = write_rules(&temp);

    command_with_rules(&rules)
        .arg("--show-priority")
        .write_stdin(STATUS)
        .assert()
        .success()
        .stdout(
            "zlib 8\n\
             kali-menu 5\n\
             ruby-rack 4\n\
             rsync 2\n\
             python-apt 0\n\
             nmap 0\n",
        );
}

#[test]
fn test_full_ranking_json() {
    let temp = TempDir::new().unwrap();
    let rules = write_rules(&temp);

    let output = command_with_rules(&rules).arg("--json").write_stdin(STATUS).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ranked: Vec<(String, u64)> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["package"].as_str().unwrap().to_string(), e["priority"].as_u64().unwrap()))
        .collect();
    assert_eq!(ranked.len(), 6);
    assert_eq!(ranked[0], ("zlib".to_string(), 8));
    assert_eq!(ranked[5], ("nmap".to_string(), 0));
}

#[test]
fn test_null_fields_compare_as_empty() {
    sort_by_priority()
        .args(["-r", r#"6="{last_pass_version}" == """#, "--show-priority"])
        .write_stdin(STATUS)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kali-menu 6\nrsync 6\n"));
}

#[test]
fn test_numeric_fields_are_text() {
    sort_by_priority()
        .args(["-r", r#"7=int("{duration_seconds}") > 300"#])
        .write_stdin(STATUS)
        .assert()
        .success()
        // kali-menu has a null duration: the rule fails for it and is logged
        .stdout(predicate::str::starts_with("python-apt\nnmap\n"))
        .stderr(predicate::str::contains("kali-menu"));
}

#[test]
fn test_bad_rules_file_fails_before_reading_input() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    fs::write(&path, "[[rule]]\npriority = 42\nexpr = 'true'\n").unwrap();

    sort_by_priority()
        .arg("--config")
        .arg(&path)
        .write_stdin(STATUS)
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("bad.toml"));
}

#[test]
fn test_input_is_not_an_array() {
    sort_by_priority()
        .write_stdin(r#"{"package": "zlib"}"#)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("JSON array"));
}
