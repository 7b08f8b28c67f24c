use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn builder_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("builder"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("BUILDER_USERNAME")
        .env_remove("BUILDER_AUTH_TOKEN")
        .env_remove("BUILDER_API_URL")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().expect("home");
    builder_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("not present, defaults"))
        .stdout(contains("api_url: https://bldr.habitat.sh/v1"))
        .stdout(contains("check_debounce_ms: 300"));
}

#[test]
fn config_show_reflects_env_override() {
    let home = TempDir::new().expect("home");
    builder_cmd(home.path())
        .env("BUILDER_API_URL", "http://127.0.0.1:9636/v1")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("api_url: http://127.0.0.1:9636/v1"));
}

#[test]
fn sign_in_then_sign_out_round_trips_session_file() {
    let home = TempDir::new().expect("home");
    let session_file = home.path().join(".builder").join("session.yaml");

    builder_cmd(home.path())
        .args(["sign-in", "--username", "bob", "--token", "tok123"])
        .assert()
        .success()
        .stdout(contains("Signed in as 'bob'"));
    let raw = fs::read_to_string(&session_file).expect("session written");
    assert!(raw.contains("bob"));

    builder_cmd(home.path())
        .arg("sign-out")
        .assert()
        .success()
        .stdout(contains("Signed out"));
    assert!(!session_file.exists());

    builder_cmd(home.path())
        .arg("sign-out")
        .assert()
        .success()
        .stdout(contains("Not signed in."));
}

#[test]
fn sign_in_rejects_blank_token() {
    let home = TempDir::new().expect("home");
    builder_cmd(home.path())
        .args(["sign-in", "--username", "bob", "--token", "  "])
        .assert()
        .failure()
        .stderr(contains("must not be empty"));
}

#[test]
fn origin_create_requires_sign_in() {
    let home = TempDir::new().expect("home");
    builder_cmd(home.path())
        .args(["origin", "create", "core"])
        .assert()
        .failure()
        .stderr(contains("not signed in"));
}

#[test]
fn origin_list_requires_sign_in() {
    let home = TempDir::new().expect("home");
    builder_cmd(home.path())
        .args(["origin", "list"])
        .assert()
        .failure()
        .stderr(contains("not signed in"));
}

#[test]
fn origin_check_rejects_invalid_name_offline() {
    let home = TempDir::new().expect("home");
    builder_cmd(home.path())
        // Unroutable API: the command must fail before any request.
        .env("BUILDER_API_URL", "http://127.0.0.1:1/v1")
        .args(["origin", "check", "Not Valid"])
        .assert()
        .failure()
        .stderr(contains("not a valid origin name"));
}

#[test]
fn malformed_config_reports_path() {
    let home = TempDir::new().expect("home");
    let root = home.path().join(".builder");
    fs::create_dir_all(&root).expect("mkdir");
    fs::write(root.join("config.yaml"), "check_debounce_ms: [not, a, number]\n").expect("write");

    builder_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(contains("config.yaml"));
}
