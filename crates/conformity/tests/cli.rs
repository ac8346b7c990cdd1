mod support;

use assert_cmd::prelude::*;
use mockito::Server;
use predicates::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

use conformity::messages;
use support::{dead_server_url, write_file, ANALYSIS_BODY};

/// The `conformity` binary with colors off and the given server.
fn conformity_cmd(server_url: &str) -> Command {
  let mut cmd = Command::cargo_bin("conformity").expect("binary exists");
  cmd.env("NO_COLOR", "1").env("CONFORMITY_SERVER_URL", server_url).env_remove("RUST_LOG");
  cmd
}

#[test]
fn test_help_lists_subcommands() {
  conformity_cmd(&dead_server_url())
    .arg("--help")
    .assert()
    .success()
    .stdout(contains("analyze").and(contains("convert")));
}

#[test]
fn test_analyze_without_transcript_alerts_and_fails() {
  let temp = TempDir::new().unwrap();
  let curriculum = write_file(&temp, "plan.xlsx", "sheet");

  conformity_cmd(&dead_server_url())
    .args(["analyze", "--curriculum"])
    .arg(&curriculum)
    .assert()
    .failure()
    .stderr(contains(messages::MISSING_FILES))
    .stderr(contains(messages::TRANSPORT).not());
}

#[test]
fn test_convert_without_file_alerts_and_fails() {
  conformity_cmd(&dead_server_url())
    .arg("convert")
    .assert()
    .failure()
    .stderr(contains(messages::MISSING_FILE));
}

#[test]
fn test_invalid_server_url_is_rejected() {
  conformity_cmd("ftp://example.com")
    .arg("convert")
    .assert()
    .failure()
    .stderr(contains("invalid server configuration"));
}

#[test]
fn test_zero_timeout_is_rejected() {
  conformity_cmd(&dead_server_url())
    .args(["--timeout", "0", "convert"])
    .assert()
    .failure()
    .stderr(contains("invalid value").and(contains("--timeout")))
    .stderr(contains(messages::MISSING_FILE).not());
}

#[test]
fn test_analyze_against_server_prints_results_and_charts() {
  let temp = TempDir::new().unwrap();
  let transcript = write_file(&temp, "lecture.vtt", "WEBVTT");
  let curriculum = write_file(&temp, "plan.xlsx", "sheet");
  let charts_dir = temp.path().join("charts");

  let mut server = Server::new();
  let mock = server
    .mock("POST", "/upload")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(ANALYSIS_BODY)
    .create();

  conformity_cmd(&server.url())
    .arg("analyze")
    .arg("--transcript")
    .arg(&transcript)
    .arg("--curriculum")
    .arg(&curriculum)
    .arg("--charts-dir")
    .arg(&charts_dir)
    .assert()
    .success()
    .stdout(contains("62.5%").and(contains("pandas")).and(contains("C 85%")));

  mock.assert();
  assert!(charts_dir.join("riskMatrix.html").exists());
  assert!(charts_dir.join("keywordFrequency.html").exists());
  assert!(charts_dir.join("curriculumComparison.html").exists());
}

#[test]
fn test_convert_against_server_saves_curriculum_json() {
  let temp = TempDir::new().unwrap();
  let spreadsheet = write_file(&temp, "plan.xlsx", "sheet");
  let download_dir = temp.path().join("downloads");

  let mut server = Server::new();
  let _mock = server
    .mock("POST", "/convert-excel-to-json")
    .with_status(200)
    .with_body("[]")
    .create();

  conformity_cmd(&server.url())
    .arg("convert")
    .arg(&spreadsheet)
    .arg("--download-dir")
    .arg(&download_dir)
    .assert()
    .success()
    .stdout(contains("curriculum.json"))
    .stderr(contains(messages::CONVERT_DONE));

  assert_eq!(std::fs::read_to_string(download_dir.join("curriculum.json")).unwrap(), "[]");
}

#[test]
fn test_convert_server_error_exits_nonzero() {
  let temp = TempDir::new().unwrap();
  let spreadsheet = write_file(&temp, "plan.csv", "a,b");

  let mut server = Server::new();
  let _mock = server
    .mock("POST", "/convert-excel-to-json")
    .with_status(400)
    .with_body(r#"{"error": "엑셀 파일(.xlsx)만 업로드 가능합니다."}"#)
    .create();

  conformity_cmd(&server.url())
    .arg("convert")
    .arg(&spreadsheet)
    .arg("--download-dir")
    .arg(temp.path())
    .assert()
    .failure()
    .stderr(contains("엑셀 파일(.xlsx)만 업로드 가능합니다."));
}
