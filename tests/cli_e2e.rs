//! End-to-end CLI tests for the datfetch binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::{dat_xml, listing_page};

fn datfetch(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("datfetch").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(config_home: &Path, contents: &str) {
    let config_dir = config_home.join("datfetch");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), contents).unwrap();
}

fn write_dat(dir: &Path, games: &[&str]) -> std::path::PathBuf {
    let dat = dir.join("gb.dat");
    std::fs::write(&dat, dat_xml("Nintendo - Game Boy", games)).unwrap();
    dat
}

async fn mock_archive(files: &[(&str, u16, &[u8])]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
            ("No-Intro", "No-Intro/"),
            ("Redump", "Redump/"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/No-Intro/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
            ("Nintendo - Game Boy", "Nintendo%20-%20Game%20Boy/"),
            ("Sega - Mega Drive - Genesis", "Sega%20-%20Mega%20Drive%20-%20Genesis/"),
        ])))
        .mount(&server)
        .await;

    let rows: Vec<(&str, &str)> = files.iter().map(|(name, _, _)| (*name, *name)).collect();
    Mock::given(method("GET"))
        .and(path("/files/No-Intro/Nintendo%20-%20Game%20Boy/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&rows)))
        .mount(&server)
        .await;

    for (name, status, body) in files {
        Mock::given(method("GET"))
            .and(path(format!("/files/No-Intro/Nintendo%20-%20Game%20Boy/{name}")))
            .respond_with(ResponseTemplate::new(*status).set_body_bytes(body.to_vec()))
            .mount(&server)
            .await;
    }
    server
}

async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[test]
fn test_help_describes_usage() {
    let config_home = TempDir::new().unwrap();
    datfetch(config_home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("DAT"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_missing_input_argument_is_a_usage_error() {
    let config_home = TempDir::new().unwrap();
    datfetch(config_home.path())
        .args(["-o", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_nonexistent_dat_fails_before_network() {
    let config_home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    datfetch(config_home.path())
        .args(["-i", "does-not-exist.dat", "-o"])
        .arg(out.path())
        .args(["--base-url", "http://127.0.0.1:9/files/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid input DAT file"));
}

#[test]
fn test_missing_output_directory_fails() {
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Foo"]);
    datfetch(config_home.path())
        .arg("-i")
        .arg(&dat)
        .arg("-o")
        .arg(work.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid output directory"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let config_home = TempDir::new().unwrap();
    write_config(config_home.path(), "parallel = 4\n");
    let work = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Foo"]);
    datfetch(config_home.path())
        .arg("-i")
        .arg(&dat)
        .arg("-o")
        .arg(work.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_run_downloads_and_prints_json_summary() {
    let server = mock_archive(&[("Foo.zip", 200, b"foo-bytes")]).await;
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Foo", "Bar"]);

    let mut cmd = datfetch(config_home.path());
    cmd.arg("-i")
        .arg(&dat)
        .arg("-o")
        .arg(out.path())
        .args(["--base-url", &format!("{}/files/", server.uri()), "--json", "-q"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["system"], "Nintendo - Game Boy");
    assert_eq!(summary["catalog"], "No-Intro");
    assert_eq!(summary["collection"], "Nintendo - Game Boy");
    assert_eq!(summary["downloaded"], 1);
    assert_eq!(summary["missing"], serde_json::json!(["Bar"]));
    assert_eq!(std::fs::read(out.path().join("Foo.zip")).unwrap(), b"foo-bytes");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_output_dir_from_config_file() {
    let server = mock_archive(&[("Foo.zip", 200, b"foo")]).await;
    let config_home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_config(
        config_home.path(),
        &format!(
            "output_dir = \"{}\"\nbase_url = \"{}/files/\"\n",
            out.path().to_string_lossy().replace('\\', "\\\\"),
            server.uri()
        ),
    );
    let work = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Foo"]);

    let mut cmd = datfetch(config_home.path());
    cmd.arg("-i").arg(&dat);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(out.path().join("Foo.zip").exists());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Downloading complete!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_partial_failure_exits_with_code_2() {
    let server = mock_archive(&[("Foo.zip", 200, b"foo"), ("Bad.zip", 500, b"")]).await;
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Foo", "Bad"]);

    let mut cmd = datfetch(config_home.path());
    cmd.arg("-i")
        .arg(&dat)
        .arg("-o")
        .arg(out.path())
        .args(["--base-url", &format!("{}/files/", server.uri()), "-r", "1"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Failed to download Bad.zip"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_failed_exits_with_code_1() {
    let server = mock_archive(&[("Bad.zip", 503, b"")]).await;
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Bad"]);

    let mut cmd = datfetch(config_home.path());
    cmd.arg("-i")
        .arg(&dat)
        .arg("-o")
        .arg(out.path())
        .args(["--base-url", &format!("{}/files/", server.uri()), "-r", "1"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_mode_reports_missing_without_downloading() {
    let server = mock_archive(&[("Foo.zip", 200, b"foo")]).await;
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dat = write_dat(work.path(), &["Foo", "Bar"]);

    let mut cmd = datfetch(config_home.path());
    cmd.arg("-i")
        .arg(&dat)
        .arg("-o")
        .arg(out.path())
        .args(["--base-url", &format!("{}/files/", server.uri()), "-l"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Following 1 files in DAT"));
    assert!(stdout.contains("Bar"));
    assert!(!out.path().join("Foo.zip").exists());
}
