//! CLI Integration Tests for saju
//!
//! These tests execute the binary and verify correct behavior for:
//! - Output formats (text, markdown, json)
//! - Export file naming
//! - Config and content overrides
//! - Error handling

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn saju() -> Command {
    let mut cmd = Command::cargo_bin("saju").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("SAJU_CONTENT_PATH")
        .env_remove("SAJU_REMOTE_URL");
    cmd
}

fn golden_args(cmd: &mut Command) -> &mut Command {
    cmd.args(["--year", "1990", "--month", "5", "--day", "15", "--hour", "14"])
}

#[test]
fn test_text_output_default() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path()).args(["--name", "홍길동"]);
    golden_args(&mut cmd);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("홍길동"))
        .stdout(predicate::str::contains("년주  庚午"))
        .stdout(predicate::str::contains("일주  乙巳"))
        .stdout(predicate::str::contains("시주  辛未"))
        .stdout(predicate::str::contains("[기본 정보]"));
}

#[test]
fn test_format_json() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path()).args(["--format", "json"]);
    golden_args(&mut cmd);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["pillars"]["month"]["stem"], "庚");
    assert_eq!(value["classification"]["dominant"], "金");
}

#[test]
fn test_format_markdown() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path()).args(["--format", "md", "--name", "홍길동"]);
    golden_args(&mut cmd);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("# 홍길동님의 사주 분석"))
        .stdout(predicate::str::contains("| 년주 | 庚 | 午 |"));
}

#[test]
fn test_traditional_hour_name() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--year", "1990", "--month", "5", "--day", "15", "--hour", "未時"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("시주  辛未"));
}

#[test]
fn test_export_uses_default_filename() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--name", "홍길동", "--format", "markdown", "--export"]);
    golden_args(&mut cmd);

    cmd.assert().success();
    let exported = temp_dir.path().join("홍길동_사주분석.md");
    assert!(exported.exists());
    assert!(fs::read_to_string(exported).unwrap().contains("## 기본 정보"));
}

#[test]
fn test_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reading.json");
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--format", "json", "--output"])
        .arg(&path);
    golden_args(&mut cmd);

    cmd.assert().success().stdout(predicate::str::is_empty());
    assert!(fs::read_to_string(&path).unwrap().contains("辛"));
}

#[test]
fn test_invalid_date_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--year", "2023", "--month", "2", "--day", "29", "--hour", "0"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid date: 2023-02-29"));
}

#[test]
fn test_missing_hour_names_field() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--year", "1990", "--month", "5", "--day", "15"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("birthHour"));
}

#[test]
fn test_hour_out_of_range() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--year", "1990", "--month", "5", "--day", "15", "--hour", "25"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 23"));
}

#[test]
fn test_max_year_flag() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--year", "2101", "--month", "1", "--day", "1", "--hour", "0", "--max-year", "2100"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("outside the supported range"));
}

#[test]
fn test_config_file_in_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".saju_config.json"),
        r#"{"aggregation": "stems_only"}"#,
    )
    .unwrap();

    let mut cmd = saju();
    cmd.current_dir(temp_dir.path()).args(["--format", "json"]);
    golden_args(&mut cmd);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["classification"]["distribution"]["weights"]["金"], 0.75);
}

#[test]
fn test_broken_content_file_renders_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let content = temp_dir.path().join("patterns.json");
    fs::write(&content, "{ not json").unwrap();

    let mut cmd = saju();
    cmd.current_dir(temp_dir.path()).arg("--content").arg(&content);
    golden_args(&mut cmd);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("패턴 데이터를 불러오지 못했습니다"));
}

#[test]
fn test_help_lists_birth_flags() {
    saju()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--hour"))
        .stdout(predicate::str::contains("--lunar"));
}

#[cfg(feature = "remote")]
#[test]
fn test_remote_env_routes_to_backend() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = saju();
    // Port 9 (discard) is closed on test hosts
    cmd.current_dir(temp_dir.path())
        .env("SAJU_REMOTE_URL", "http://127.0.0.1:9");
    golden_args(&mut cmd);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Network error"));
}

#[cfg(feature = "remote")]
#[test]
fn test_remote_flag_overrides_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".saju_config.json"),
        r#"{"remote_url": "http://127.0.0.1:1"}"#,
    )
    .unwrap();
    let mut cmd = saju();
    cmd.current_dir(temp_dir.path())
        .args(["--remote", "http://127.0.0.1:9"])
        .env("RUST_LOG", "saju=info");
    golden_args(&mut cmd);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("backend=\"http://127.0.0.1:9\"").or(
            predicate::str::contains("backend=http://127.0.0.1:9"),
        ));
}
