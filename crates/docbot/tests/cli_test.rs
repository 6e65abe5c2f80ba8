//! Integration tests for the `docbot` CLI binary.
//!
//! Argument parsing, help output and configuration run without a service;
//! the remaining tests point the binary at a wiremock admin API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `docbot` binary with env isolation.
///
/// Clears all `DOCBOT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn docbot_cmd() -> assert_cmd::Command {
    docbot_cmd_with_config_home(Path::new("/tmp/docbot-cli-test-nonexistent"))
}

fn docbot_cmd_with_config_home(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("docbot");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("DOCBOT_API_URL")
        .env_remove("DOCBOT_OUTPUT")
        .env_remove("DOCBOT_TIMEOUT")
        .env_remove("DOCBOT_EXPORT_DIR")
        .env_remove("DOCBOT_ADMIN_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn stats_body() -> Value {
    json!({
        "total_conversions": 1520,
        "today_conversions": 42,
        "success_rate": 97.3,
        "pending": 2,
        "active_users": 18,
        "avg_processing_time_ms": 1840,
        "top_feature": "pdf_to_word",
        "total_bandwidth_mb": 312.5
    })
}

async fn mount_stats(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = docbot_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    docbot_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("DocBot")
            .and(predicate::str::contains("stats"))
            .and(predicate::str::contains("conversions"))
            .and(predicate::str::contains("export")),
    );
}

#[test]
fn test_version_flag() {
    docbot_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("docbot"));
}

#[test]
fn test_completions_bash() {
    docbot_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = docbot_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_output_format() {
    let output = docbot_cmd().args(["-o", "xml", "stats"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("invalid value"));
}

#[test]
fn test_timeseries_days_out_of_range() {
    for days in ["0", "366"] {
        let output = docbot_cmd()
            .args(["analytics", "timeseries", "--days", days])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(2), "days={days}");
    }
}

#[test]
fn test_malformed_api_url_is_usage_error() {
    let output = docbot_cmd()
        .args(["--api-url", "not a url", "stats"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("api_url"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    docbot_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("docbot-cli-test-nonexistent")
                .and(predicate::str::ends_with("config.toml\n")),
        );
}

#[test]
fn test_config_show_reflects_flags() {
    docbot_cmd()
        .args(["--api-url", "http://10.0.0.5:8000", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("api_url = \"http://10.0.0.5:8000\"")
                .and(predicate::str::contains("[intervals]")),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let home = tempfile::tempdir().unwrap();

    docbot_cmd_with_config_home(home.path())
        .args(["--api-url", "http://10.0.0.5:8000", "config", "init"])
        .assert()
        .success();

    let config_file = home.path().join("docbot").join("config.toml");
    let written = std::fs::read_to_string(config_file).unwrap();
    assert!(written.contains("http://10.0.0.5:8000"));

    let output = docbot_cmd_with_config_home(home.path())
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--force"));

    docbot_cmd_with_config_home(home.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

// ── Against an admin service ────────────────────────────────────────

#[test]
fn test_unreachable_service_exits_with_connection_code() {
    let output = docbot_cmd()
        .args(["--api-url", "http://127.0.0.1:9", "--timeout", "5", "stats"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    assert!(combined_output(&output).contains("127.0.0.1:9"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stats_as_json() {
    let server = MockServer::start().await;
    mount_stats(&server).await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args(["--api-url", uri.as_str(), "-o", "json", "stats"]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed, stats_body());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_conversions_filtered_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/conversions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "c-3", "phone_number": "919800000003", "timestamp": "2024-06-15T10:32:00",
             "status": "failed", "file_size": 1024},
            {"id": "c-2", "phone_number": "919800000002", "timestamp": "2024-06-15T10:31:00",
             "status": "success", "file_size": 2048, "feature": "pdf_to_word"},
            {"id": "c-1", "phone_number": "919800000001", "timestamp": "2024-06-15T10:30:00",
             "status": "success", "file_size": 4096}
        ])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args([
        "--api-url",
        uri.as_str(),
        "-o",
        "plain",
        "conversions",
        "--status",
        "success",
        "--limit",
        "1",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        ["c-2\tsuccess\t2024-06-15 10:31:00"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeseries_passes_days() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/analytics/timeseries"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"date": "2024-06-15", "conversions": 10, "successes": 9, "failures": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args([
        "--api-url",
        uri.as_str(),
        "-o",
        "plain",
        "analytics",
        "timeseries",
        "--days",
        "7",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "2024-06-15\t10\t9\t1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ping_healthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "timestamp": "2024-06-15T10:30:00.123456"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args(["--api-url", uri.as_str(), "ping"]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("healthy"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_detail_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/system/health"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "psutil unavailable" })),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args(["--api-url", uri.as_str(), "health"]);
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("psutil unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_csv_into_dir() {
    let server = MockServer::start().await;
    let csv = "id,phone_number,timestamp,status\nc-1,919800000001,2024-06-15T10:30:00,success\n";
    Mock::given(method("GET"))
        .and(path("/api/admin/conversions/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string(csv),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args(["--api-url", uri.as_str(), "-o", "plain", "export", "--dir"])
        .arg(dir.path());
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let written = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    assert!(written.contains("conversions-export-"), "{written}");
    assert_eq!(std::fs::read_to_string(&written).unwrap(), csv);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_short_password_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/settings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args([
        "--api-url",
        uri.as_str(),
        "settings",
        "set",
        "--business-account-id",
        "1234567890",
        "--phone-number-id",
        "9876543210",
        "--access-token",
        "EAAGm0PX4ZCpsBAKZAZBZAZB",
        "--webhook-verify-token",
        "verify-me",
        "--password-stdin",
    ])
    .write_stdin("abc\n");
    let output = run_blocking(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("at least 6 characters"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_set_sends_password_from_env() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/settings"))
        .and(wiremock::matchers::body_json(json!({
            "whatsapp_business_account_id": "1234567890",
            "phone_number_id": "9876543210",
            "access_token": "EAAGm0PX4ZCpsBAKZAZBZAZB",
            "webhook_verify_token": "verify-me",
            "admin_password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Settings saved successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.env("DOCBOT_ADMIN_PASSWORD", "secret1").args([
        "--api-url",
        uri.as_str(),
        "settings",
        "set",
        "--business-account-id",
        "1234567890",
        "--phone-number-id",
        "9876543210",
        "--access-token",
        "EAAGm0PX4ZCpsBAKZAZBZAZB",
        "--webhook-verify-token",
        "verify-me",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Settings saved successfully"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_set_keeps_omitted_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "whatsapp_business_account_id": "1234567890",
            "phone_number_id": "9876543210",
            "access_token": "EAAGm0PX4Z...ZAZB",
            "webhook_verify_token": "verify-me"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/settings"))
        .and(wiremock::matchers::body_json(json!({
            "whatsapp_business_account_id": "1234567890",
            "phone_number_id": "1111111111",
            "access_token": "EAAGm0PX4Z...ZAZB",
            "webhook_verify_token": "verify-me",
            "admin_password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Settings saved successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.env("DOCBOT_ADMIN_PASSWORD", "secret1").args([
        "--api-url",
        uri.as_str(),
        "settings",
        "set",
        "--phone-number-id",
        "1111111111",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = MockServer::start().await;
    mount_stats(&server).await;

    let uri = server.uri();
    let mut cmd = docbot_cmd();
    cmd.args([
        "--api-url",
        uri.as_str(),
        "-o",
        "json-compact",
        "watch",
        "stats",
        "--count",
        "2",
        "--interval",
        "100ms",
    ]);
    let output = run_blocking(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    for line in lines {
        let parsed: Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["total_conversions"], 1520);
    }
    assert!(server.received_requests().await.unwrap().len() >= 2);
}
