//! Integration tests for the PassVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! The master passphrase comes from `PASSVAULT_PASSWORD` and stdin is
//! never a terminal here, so every command runs non-interactively.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "correct horse battery";
const STRONG: &str = "Tr0ub4dor&3-horse-staple";

/// A temp dir holding a fast-KDF config and (eventually) the vault.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        dir.child("config.toml")
            .write_str(
                "argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n",
            )
            .unwrap();
        Self { dir }
    }

    fn vault(&self) -> std::path::PathBuf {
        self.dir.path().join("vault.pvlt")
    }

    /// `passvault` with this fixture's config, vault and passphrase.
    fn cmd(&self) -> Command {
        self.cmd_with_passphrase(MASTER)
    }

    fn cmd_with_passphrase(&self, passphrase: &str) -> Command {
        let mut cmd = passvault();
        cmd.env("PASSVAULT_CONFIG", self.dir.path().join("config.toml"))
            .env("PASSVAULT_VAULT", self.vault())
            .env("PASSVAULT_PASSWORD", passphrase)
            .env_remove("PASSVAULT_LOG");
        cmd
    }

    fn add_github(&self) {
        self.cmd()
            .args(["add", "Github", "--username", "octocat", "--url", "https://github.com"])
            .write_stdin(format!("{STRONG}\n"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Account 'Github' added"));
    }
}

/// Helper: get a Command pointing at the passvault binary.
fn passvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("passvault").expect("binary should exist")
}

#[test]
fn help_flag_shows_usage() {
    passvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted password vault"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("get-password"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn no_args_shows_help() {
    passvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn add_get_and_get_password() {
    let fx = Fixture::new();
    fx.add_github();

    fx.cmd()
        .args(["get", "Github"])
        .assert()
        .success()
        .stdout(predicate::str::contains("octocat"))
        .stdout(predicate::str::contains("https://github.com"))
        .stdout(predicate::str::contains(STRONG).not());

    // Exact bytes, no trailing newline.
    fx.cmd()
        .args(["get-password", "Github"])
        .assert()
        .success()
        .stdout(STRONG);
}

#[test]
fn generated_password_has_configured_length() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["add", "mail", "--generate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("generated"));

    let out = fx
        .cmd()
        .args(["get-password", "mail"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().chars().count(), 24);
}

#[test]
fn list_shows_names_in_order() {
    let fx = Fixture::new();
    for name in ["zeta", "alpha"] {
        fx.cmd()
            .args(["add", name, "--generate"])
            .assert()
            .success();
    }

    let out = fx.cmd().arg("list").assert().success().get_output().stdout.clone();
    let out = String::from_utf8(out).unwrap();
    let alpha = out.find("alpha").unwrap();
    let zeta = out.find("zeta").unwrap();
    assert!(alpha < zeta);
}

#[test]
fn duplicate_add_fails() {
    let fx = Fixture::new();
    fx.add_github();

    fx.cmd()
        .args(["add", "Github", "--generate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn weak_password_is_rejected() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["add", "bank"])
        .write_stdin("hunter2\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("too weak"));

    assert!(!fx.vault().exists());
}

#[test]
fn wrong_passphrase_fails_without_touching_the_vault() {
    let fx = Fixture::new();
    fx.add_github();
    let before = std::fs::read(fx.vault()).unwrap();

    fx.cmd_with_passphrase("definitely wrong")
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Wrong master passphrase"));

    assert_eq!(std::fs::read(fx.vault()).unwrap(), before);
}

#[test]
fn update_with_empty_stdin_keeps_the_password() {
    let fx = Fixture::new();
    fx.add_github();

    fx.cmd()
        .args(["update", "Github", "--username", "hubber"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    fx.cmd()
        .args(["get", "Github"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hubber"));
    fx.cmd()
        .args(["get-password", "Github"])
        .assert()
        .success()
        .stdout(STRONG);
}

#[test]
fn update_without_changes_leaves_the_vault_alone() {
    let fx = Fixture::new();
    fx.add_github();
    let before = std::fs::read(fx.vault()).unwrap();

    fx.cmd()
        .args(["update", "Github"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to change"));

    assert_eq!(std::fs::read(fx.vault()).unwrap(), before);
}

#[test]
fn update_missing_account_fails() {
    let fx = Fixture::new();
    fx.add_github();

    fx.cmd()
        .args(["update", "Gitlab", "--generate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn delete_requires_force_when_not_interactive() {
    let fx = Fixture::new();
    fx.add_github();

    fx.cmd()
        .args(["delete", "Github"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    fx.cmd()
        .args(["delete", "Github", "--force"])
        .assert()
        .success();

    fx.cmd()
        .args(["delete", "Github", "--force"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn list_on_missing_vault_is_empty_and_creates_nothing() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("No accounts"));

    assert!(!fx.vault().exists());
}

#[test]
fn new_vault_needs_a_reasonable_passphrase() {
    let fx = Fixture::new();
    fx.cmd_with_passphrase("short")
        .args(["add", "mail", "--generate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at least 8"));

    assert!(!fx.vault().exists());
}

#[test]
fn missing_passphrase_without_terminal_fails() {
    let fx = Fixture::new();
    fx.cmd()
        .env_remove("PASSVAULT_PASSWORD")
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PASSVAULT_PASSWORD"));
}

#[test]
fn invalid_config_is_reported() {
    let fx = Fixture::new();
    fx.dir
        .child("config.toml")
        .write_str("lock_policy = \"sometimes\"\n")
        .unwrap();

    fx.cmd()
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file error"));
}

#[test]
fn completions_bash() {
    passvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passvault"));
}

#[test]
fn completions_unknown_shell_fails() {
    passvault()
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown shell"));
}
