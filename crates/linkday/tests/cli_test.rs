//! Integration tests for the `linkday` CLI binary.
//!
//! Argument parsing, help and completions run offline. Backend-bound
//! commands run against a wiremock server with config and state isolated
//! in a temporary directory.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `linkday` binary with env isolation.
///
/// Clears all `LINKDAY_*` env vars and points config and data at `home`
/// so tests never touch the user's real configuration.
fn linkday_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("linkday");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("LINKDAY_CONFIG", home.join("config.toml"))
        .env("LINKDAY_DATA_DIR", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("LINKDAY_PROFILE")
        .env_remove("LINKDAY_API_URL")
        .env_remove("LINKDAY_OUTPUT")
        .env_remove("LINKDAY_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn credential_path(home: &Path) -> PathBuf {
    home.join("data/profiles/default/credential.json")
}

fn session_path(home: &Path) -> PathBuf {
    home.join("data/profiles/default/auth-storage.json")
}

fn seed_credential(home: &Path, token: &str) {
    let path = credential_path(home);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, json!({ "token": token }).to_string()).unwrap();
}

/// Write an authenticated session for `username` as a previous run would.
fn seed_session(home: &Path, username: &str) {
    let path = session_path(home);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let stored = json!({
        "state": { "user": user_json(username), "isAuthenticated": true },
        "version": 0
    });
    std::fs::write(path, stored.to_string()).unwrap();
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the blocking binary off the runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn user_json(username: &str) -> serde_json::Value {
    json!({
        "_id": "u1",
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "username": username,
        "theme": "light",
        "isActive": true,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-15T10:30:00Z"
    })
}

fn link_json(id: &str, order: u32, active: bool) -> serde_json::Value {
    json!({
        "_id": id,
        "userId": "u1",
        "title": format!("Link {id}"),
        "url": format!("https://{id}.example"),
        "order": order,
        "clicks": 2,
        "isActive": active,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-15T10:30:00Z"
    })
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

/// Backend that accepts `jwt-1` and holds links a, b, c.
async fn signed_in_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ok(user_json("ada")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/links"))
        .respond_with(ok(json!([
            link_json("b", 1, true),
            link_json("a", 0, true),
            link_json("c", 2, false)
        ])))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = linkday_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("link-in-bio")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("links"))
            .and(predicate::str::contains("public")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("linkday"));
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = linkday_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("foobar"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file_uses_defaults() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile = \"default\""));
}

#[test]
fn test_config_path_reports_overrides() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml").and(predicate::str::contains("data")));
}

#[test]
fn test_config_set_default_rejects_unknown_profile() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path())
        .args(["config", "set-default", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_unknown_profile_fails_before_any_request() {
    let home = TempDir::new().unwrap();
    linkday_cmd(home.path())
        .args(["--profile", "staging", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'staging' not found"));
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_protected_command_without_credential_makes_no_request() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "links", "list"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Not signed in"), "{text}");
    assert!(text.contains("linkday login"), "{text}");
}

#[tokio::test]
async fn test_login_stores_credential_and_session() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "Secret123" })))
        .respond_with(ok(json!({ "token": "jwt-1", "user": user_json("ada") })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args([
        "--api-url",
        &server.uri(),
        "-o",
        "plain",
        "login",
        "--email",
        "ada@example.com",
        "--password-stdin",
    ])
    .write_stdin("Secret123\n");
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ada");

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(credential_path(home.path())).unwrap())
            .unwrap();
    assert_eq!(stored["token"], "jwt-1");

    let session: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(session_path(home.path())).unwrap())
            .unwrap();
    assert_eq!(session["state"]["isAuthenticated"], true);
    assert_eq!(session["state"]["user"]["username"], "ada");
}

#[tokio::test]
async fn test_login_with_invalid_email_is_rejected_locally() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args([
        "--api-url",
        &server.uri(),
        "login",
        "--email",
        "not-an-email",
        "--password-stdin",
    ])
    .write_stdin("Secret123\n");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(!credential_path(home.path()).exists());
}

#[tokio::test]
async fn test_login_failure_reports_server_message() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "success": false, "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args([
        "--api-url",
        &server.uri(),
        "login",
        "--email",
        "ada@example.com",
        "--password-stdin",
    ])
    .write_stdin("Wrong1234\n");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Invalid credentials"));
    assert!(!credential_path(home.path()).exists());
}

#[tokio::test]
async fn test_rejected_credential_is_cleared() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "stale");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "message": "Invalid token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "whoami"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(!credential_path(home.path()).exists());
}

#[tokio::test]
async fn test_expired_credential_on_links_allows_signing_in_again() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "expired");
    seed_session(home.path(), "ada");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/links"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "message": "jwt expired" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ok(json!({ "token": "jwt-2", "user": user_json("ada") })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "links", "list"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(!credential_path(home.path()).exists());
    let session: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(session_path(home.path())).unwrap())
            .unwrap();
    assert_eq!(session["state"]["isAuthenticated"], false);

    let mut cmd = linkday_cmd(home.path());
    cmd.args([
        "--api-url",
        &server.uri(),
        "login",
        "--email",
        "ada@example.com",
        "--password-stdin",
    ])
    .write_stdin("Secret123\n");
    let output = run(cmd).await;

    let out = combined_output(&output);
    assert!(output.status.success(), "{out}");
    assert!(!out.contains("Already signed in"));
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(credential_path(home.path())).unwrap())
            .unwrap();
    assert_eq!(stored["token"], "jwt-2");
}

#[tokio::test]
async fn test_whoami_revalidates_stored_credential() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "whoami"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ada Lovelace"));
    assert!(stdout.contains("/u/ada"));
}

#[tokio::test]
async fn test_logout_forgets_credential_without_request() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "logout"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(!credential_path(home.path()).exists());
}

// ── Links ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_links_list_is_in_page_order() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "json", "links", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let links: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = links
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_links_reorder_sends_permutation() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;
    Mock::given(method("PATCH"))
        .and(path("/api/links/reorder"))
        .and(body_json(json!({ "linkIds": ["c", "a", "b"] })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Links reordered" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args([
        "--api-url",
        &server.uri(),
        "-o",
        "plain",
        "links",
        "reorder",
        "c",
        "a",
        "b",
    ]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "c\na\nb");
}

#[tokio::test]
async fn test_links_reorder_with_unknown_id_is_not_sent() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;
    Mock::given(method("PATCH"))
        .and(path("/api/links/reorder"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "links", "reorder", "c", "a", "zzz"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
}

#[tokio::test]
async fn test_links_add_rejects_relative_url() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/links"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "links", "add", "Blog", "not a url"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("url"));
}

#[tokio::test]
async fn test_links_rm_requires_yes_without_terminal() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "links", "rm", "a"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test]
async fn test_links_rm_with_yes_deletes() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;
    Mock::given(method("DELETE"))
        .and(path("/api/links/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Link deleted" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-y", "-o", "plain", "links", "rm", "a"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "b\nc");
}

#[tokio::test]
async fn test_analytics_summarises_clicks() {
    let home = TempDir::new().unwrap();
    seed_credential(home.path(), "jwt-1");
    let server = signed_in_backend().await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "json", "analytics"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["totalClicks"], 6);
    assert_eq!(summary["totalLinks"], 3);
    assert_eq!(summary["activeLinks"], 2);
}

// ── Visitor surface ─────────────────────────────────────────────────

async fn public_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u/ada"))
        .respond_with(ok(json!({
            "user": user_json("ada"),
            "links": [link_json("b", 1, true), link_json("c", 2, false), link_json("a", 0, true)]
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_public_page_shows_active_links_in_order() {
    let home = TempDir::new().unwrap();
    let server = public_backend().await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "plain", "public", "ada"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "https://a.example\nhttps://b.example"
    );
}

#[tokio::test]
async fn test_open_tracks_click_and_prints_destination() {
    let home = TempDir::new().unwrap();
    let server = public_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/click/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Click recorded",
            "redirectUrl": "https://a.example/?ref=linkday"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "open", "a", "--user", "ada"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "https://a.example/?ref=linkday"
    );
}

#[tokio::test]
async fn test_open_falls_back_when_tracking_fails() {
    let home = TempDir::new().unwrap();
    let server = public_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/click/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "open", "b", "--user", "ada"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "https://b.example");
}

#[tokio::test]
async fn test_open_hidden_link_is_not_found() {
    let home = TempDir::new().unwrap();
    let server = public_backend().await;

    let mut cmd = linkday_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "open", "c", "--user", "ada"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
}
