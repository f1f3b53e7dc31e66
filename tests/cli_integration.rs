//! Integration tests for the Lockbox CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  Every
//! test gets its own home and key-cache directory, and passwords come
//! from `LOCKBOX_PASSWORD` so nothing prompts.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "password123";

/// Helper: a temp home whose config keeps the cached key inside it.
fn home() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.child("cache");
    cache.create_dir_all().unwrap();
    tmp.child("config.toml")
        .write_str(&format!(
            "key_cache_dir = {:?}\n",
            cache.path().to_str().unwrap()
        ))
        .unwrap();
    tmp
}

/// Helper: get a Command pointing at the lockbox binary inside `home`.
fn lockbox(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lockbox").expect("binary should exist");
    cmd.env("LOCKBOX_HOME", home.path())
        .env("LOCKBOX_PASSWORD", PASSWORD)
        .env_remove("LOCKBOX_LOG");
    cmd
}

/// Helper: a home with an initialized, unlocked vault.
fn initialized() -> TempDir {
    let tmp = home();
    lockbox(&tmp).arg("init").assert().success();
    tmp
}

#[test]
fn help_flag_shows_usage() {
    #[allow(deprecated)]
    Command::cargo_bin("lockbox")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted credential and alias store"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("unlock"))
        .stdout(predicate::str::contains("creds"))
        .stdout(predicate::str::contains("alias"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn no_args_shows_help() {
    #[allow(deprecated)]
    Command::cargo_bin("lockbox")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_command_prints_version() {
    let tmp = home();
    lockbox(&tmp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_for_unknown_shell_fail() {
    let tmp = home();
    lockbox(&tmp)
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'csh'"));
}

#[test]
fn completions_bash_mentions_binary() {
    let tmp = home();
    lockbox(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lockbox"));
}

#[test]
fn init_creates_vault_and_session() {
    let tmp = initialized();
    tmp.child("vault.enc").assert(predicate::path::exists());
    tmp.child("session.json").assert(predicate::path::exists());
    tmp.child("cache").assert(predicate::path::is_dir());
}

#[test]
fn init_twice_fails_without_force() {
    let tmp = initialized();
    lockbox(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_force_replaces_vault() {
    let tmp = initialized();
    lockbox(&tmp)
        .args(["creds", "add", "mail", "-u", "me", "-p", "pw"])
        .assert()
        .success();

    lockbox(&tmp).args(["init", "--force"]).assert().success();

    lockbox(&tmp)
        .args(["creds", "get", "mail", "-p"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn failed_forced_reinit_keeps_existing_vault() {
    let tmp = initialized();
    lockbox(&tmp)
        .args(["creds", "add", "mail", "-u", "me", "-p", "pw"])
        .assert()
        .success();

    lockbox(&tmp)
        .env("LOCKBOX_PASSWORD", "short")
        .args(["init", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));

    tmp.child("vault.enc").assert(predicate::path::exists());
    lockbox(&tmp)
        .args(["creds", "get", "mail", "-p"])
        .assert()
        .success()
        .stdout(predicate::str::diff("pw\n"));
}

#[test]
fn short_master_password_is_rejected() {
    let tmp = home();
    lockbox(&tmp)
        .env("LOCKBOX_PASSWORD", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    tmp.child("vault.enc").assert(predicate::path::missing());
}

#[test]
fn creds_add_get_list_delete() {
    let tmp = initialized();

    lockbox(&tmp)
        .args([
            "creds", "add", "github", "-u", "octocat", "-p", "hunter2", "-t", "dev,code",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added credential 'github'"));

    lockbox(&tmp)
        .args(["creds", "get", "github", "--password"])
        .assert()
        .success()
        .stdout(predicate::str::diff("hunter2\n"));

    lockbox(&tmp)
        .args(["creds", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("octocat"))
        .stdout(predicate::str::contains("hunter2").not());

    lockbox(&tmp)
        .args(["creds", "delete", "github", "--force"])
        .assert()
        .success();

    lockbox(&tmp)
        .args(["creds", "get", "github", "-p"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn creds_add_duplicate_fails() {
    let tmp = initialized();
    lockbox(&tmp)
        .args(["creds", "add", "x", "-u", "a", "-p", "b"])
        .assert()
        .success();
    lockbox(&tmp)
        .args(["creds", "add", "x", "-u", "a", "-p", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn creds_update_renames_and_clears_notes() {
    let tmp = initialized();
    lockbox(&tmp)
        .args(["creds", "add", "mail", "-u", "me", "-p", "pw", "-n", "old note"])
        .assert()
        .success();

    lockbox(&tmp)
        .args(["creds", "update", "mail", "--new-name", "work", "-n", ""])
        .assert()
        .success();

    lockbox(&tmp)
        .args(["creds", "get", "work", "--details"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"work\""))
        .stdout(predicate::str::contains("\"notes\": \"\""))
        .stdout(predicate::str::contains("\"password\": \"pw\""));
}

#[test]
fn alias_roundtrip_through_cli() {
    let tmp = initialized();
    lockbox(&tmp)
        .args(["alias", "add", "deploy", "-c", "make deploy"])
        .assert()
        .success();

    lockbox(&tmp)
        .args(["alias", "get", "deploy", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::diff("make deploy\n"));

    lockbox(&tmp)
        .args(["alias", "update", "deploy", "-c", "make release"])
        .assert()
        .success();

    lockbox(&tmp)
        .args(["alias", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("make release"));
}

#[test]
fn lock_then_crud_requires_session() {
    let tmp = initialized();
    lockbox(&tmp).arg("lock").assert().success();
    tmp.child("session.json").assert(predicate::path::missing());

    lockbox(&tmp)
        .args(["creds", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active session"));
}

#[test]
fn unlock_restores_access() {
    let tmp = initialized();
    lockbox(&tmp)
        .args(["creds", "add", "a", "-u", "u", "-p", "secret-a"])
        .assert()
        .success();
    lockbox(&tmp).arg("lock").assert().success();

    lockbox(&tmp).arg("unlock").assert().success();
    lockbox(&tmp)
        .args(["creds", "get", "a", "-p"])
        .assert()
        .success()
        .stdout(predicate::str::diff("secret-a\n"));
}

#[test]
fn unlock_with_wrong_password_fails() {
    let tmp = initialized();
    lockbox(&tmp).arg("lock").assert().success();

    lockbox(&tmp)
        .env("LOCKBOX_PASSWORD", "wrong-password")
        .arg("unlock")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
    tmp.child("session.json").assert(predicate::path::missing());
}

#[test]
fn session_without_cached_key_is_locked() {
    let tmp = initialized();
    // Simulate a reboot wiping the volatile key cache.
    std::fs::remove_dir_all(tmp.child("cache").path()).unwrap();

    lockbox(&tmp)
        .args(["creds", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
}

#[test]
fn crud_without_vault_fails() {
    let tmp = home();
    lockbox(&tmp)
        .args(["creds", "list"])
        .assert()
        .failure();
}

#[test]
fn generate_show_prints_password_of_requested_length() {
    let tmp = home();
    lockbox(&tmp)
        .args(["generate", "--show", "-l", "24", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^[A-Za-z0-9]{24}$").unwrap());
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child("config.toml")
        .write_str("session_lifespan_secs = 0\n")
        .unwrap();

    lockbox(&tmp)
        .arg("unlock")
        .assert()
        .failure()
        .stderr(predicate::str::contains("session_lifespan_secs"));
}

#[test]
fn two_homes_sharing_a_key_cache_dir_stay_unlocked() {
    let cache = TempDir::new().unwrap();
    let config = format!("key_cache_dir = {:?}\n", cache.path().to_str().unwrap());

    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    for home in [&first, &second] {
        home.child("config.toml").write_str(&config).unwrap();
    }

    lockbox(&first).arg("init").assert().success();
    lockbox(&first)
        .args(["creds", "add", "a", "-u", "u", "-p", "secret-a"])
        .assert()
        .success();

    lockbox(&second)
        .env("LOCKBOX_PASSWORD", "another-password")
        .arg("init")
        .assert()
        .success();
    lockbox(&second).arg("lock").assert().success();

    lockbox(&first)
        .args(["creds", "get", "a", "-p"])
        .assert()
        .success()
        .stdout(predicate::str::diff("secret-a\n"));
}
