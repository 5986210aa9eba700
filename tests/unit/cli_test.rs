//! Integration tests for the sort-by-priority CLI

use std::fs;

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

const KALI_INPUT: &str = r#"[
  {"package": "foo", "version": "1.0-kali1", "status": "pass"},
  {"package": "bar", "version": "1.0", "status": "fail"}
]"#;

const KALI_RULE: &str = r#"5=re.search(r"kali","{version}")"#;

fn sort_by_priority() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("sort-by-priority"))
}

#[test]
fn test_version() {
    sort_by_priority()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sort-by-priority"))
        .stdout(predicate::str::contains(::sort_by_priority::VERSION));
}

#[test]
fn test_help_mentions_rule_flag() {
    sort_by_priority()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--priority-rule"));
}

#[test]
fn test_rule_moves_matching_package_first() {
    sort_by_priority()
        .args(["--priority-rule", KALI_RULE])
        .write_stdin(KALI_INPUT)
        .assert()
        .success()
        .stdout("foo\nbar\n");
}

#[test]
fn test_show_priority() {
    sort_by_priority()
        .args(["-r", KALI_RULE, "--show-priority"])
        .write_stdin(KALI_INPUT)
        .assert()
        .success()
        .stdout("foo 5\nbar 0\n");
}

#[test]
fn test_priority_alias() {
    sort_by_priority()
        .args(["--priority", r#"3="{status}" == "fail""#, "--show-priority"])
        .write_stdin(KALI_INPUT)
        .assert()
        .success()
        .stdout("bar 3\nfoo 0\n");
}

#[test]
fn test_no_rules_keeps_input_order() {
    sort_by_priority()
        .write_stdin(KALI_INPUT)
        .assert()
        .success()
        .stdout("foo\nbar\n");
}

#[test]
fn test_empty_input() {
    sort_by_priority().args(["-r", KALI_RULE]).write_stdin("[]").assert().success().stdout("");
}

#[test]
fn test_json_output() {
    let output = sort_by_priority()
        .args(["-r", KALI_RULE, "--json"])
        .write_stdin(KALI_INPUT)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["package"], "foo");
    assert_eq!(json[0]["priority"], 5);
    assert_eq!(json[1]["package"], "bar");
}

#[test]
fn test_priority_above_range_fails() {
    sort_by_priority()
        .args(["-r", "11=true"])
        .write_stdin(KALI_INPUT)
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("between 0 and 10"));
}

#[test]
fn test_negative_priority_fails() {
    sort_by_priority()
        .args(["-r", "-1=true"])
        .write_stdin(KALI_INPUT)
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("got -1"));
}

#[test]
fn test_rule_without_equals_fails() {
    sort_by_priority()
        .args(["-r", "true"])
        .write_stdin(KALI_INPUT)
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn test_invalid_json_fails() {
    sort_by_priority()
        .write_stdin("not json")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("stdin"));
}

#[test]
fn test_record_without_package_fails() {
    sort_by_priority()
        .write_stdin(r#"[{"version": "1.0"}]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("package"));
}

#[test]
fn test_failing_rule_is_not_fatal() {
    sort_by_priority()
        .args(["-r", r#"9="{missing}" == "x""#, "-r", r#"2="{status}" == "fail""#])
        .write_stdin(KALI_INPUT)
        .assert()
        .success()
        .stdout("bar\nfoo\n")
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_now_pins_date_helpers() {
    let input = r#"[
      {"package": "fresh", "date": "2024-02-29 12:00:00"},
      {"package": "stale", "date": "2024-01-01 12:00:00"}
    ]"#;
    sort_by_priority()
        .args(["--now", "2024-03-01 12:00:00", "-r", r#"8=age_days("{date}") > 30"#])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("stale\nfresh\n");
}

#[test]
fn test_python_datetime_rule_is_accepted() {
    let input = r#"[
      {"package": "fresh", "date": "2024-02-29 12:00:00"},
      {"package": "stale", "date": "2024-01-01 12:00:00"}
    ]"#;
    let rule = r#"8=datetime.datetime.now() - datetime.datetime.strptime("{date}", "%Y-%m-%d %H:%M:%S") > datetime.timedelta(days=30)"#;
    sort_by_priority()
        .args(["--now", "2024-03-01 12:00:00", "--show-priority", "-r", rule])
        .write_stdin(input)
        .assert()
        .success()
        .stdout("stale 8\nfresh 0\n");
}

#[test]
fn test_invalid_now_fails() {
    sort_by_priority()
        .args(["--now", "yesterday"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--now"));
}

#[test]
fn test_config_file_rules() {
    let temp = TempDir::new().unwrap();
    let rules = temp.path().join("rules.toml");
    fs::write(
        &rules,
        r#"
[[rule]]
priority = 4
expr = '"{status}" == "fail"'
"#,
    )
    .unwrap();

    sort_by_priority()
        .arg("--config")
        .arg(&rules)
        .args(["-r", KALI_RULE, "--show-priority"])
        .write_stdin(KALI_INPUT)
        .assert()
        .success()
        .stdout("foo 5\nbar 4\n");
}

#[test]
fn test_input_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("status.json");
    fs::write(&input, KALI_INPUT).unwrap();

    sort_by_priority()
        .arg("--input")
        .arg(&input)
        .args(["-r", r#"1="{package}" == "bar""#])
        .assert()
        .success()
        .stdout("bar\nfoo\n");
}

#[test]
fn test_unknown_flag_is_usage_error() {
    sort_by_priority().arg("--frobnicate").assert().failure().code(2);
}
