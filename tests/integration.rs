use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn apolo(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("apolo").unwrap();
    cmd.env_remove("APOLO_CONFIG_DIR")
        .arg("--config-dir")
        .arg(config_dir);
    cmd
}

/// A fake Spotify install with one stylesheet and a prefs file carrying
/// `version`, plus a config pointing at both.
struct Install {
    tmp: TempDir,
}

impl Install {
    fn new(version: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let css = tmp.path().join("spotify/Apps/zlink/css");
        fs::create_dir_all(&css).unwrap();
        fs::write(css.join("glue.css"), "body { color: white; }\n").unwrap();
        fs::write(
            tmp.path().join("prefs"),
            format!("app.last-launched-version=\"{version}\"\n"),
        )
        .unwrap();

        let config = serde_json::json!({
            "setting": {
                "spotify_path": tmp.path().join("spotify"),
                "prefs_path": tmp.path().join("prefs"),
            }
        });
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(
            tmp.path().join("config/config.json"),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .unwrap();
        Self { tmp }
    }

    fn config_dir(&self) -> PathBuf {
        self.tmp.path().join("config")
    }
}

#[test]
fn test_help_flag() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Spotify desktop client"));
}

#[test]
fn test_version_flag() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apolo 0.2.0"));
}

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("backup")
                .and(predicate::str::contains("restore"))
                .and(predicate::str::contains("enable-devtools"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn test_unknown_subcommand() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("foobar")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_print_config_path() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn test_first_run_writes_default_config() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path()).assert().success();

    let written = fs::read_to_string(tmp.path().join("config.json")).unwrap();
    assert!(written.contains("current_theme"));
    assert!(written.contains("ApoloDefault"));
}

#[test]
fn test_quiet_prints_nothing() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_apply_without_backup_fails() {
    let install = Install::new("1.2.3");
    apolo(&install.config_dir())
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains("backup"));
}

#[test]
fn test_restore_without_backup_fails() {
    let install = Install::new("1.2.3");
    apolo(&install.config_dir())
        .args(["-q", "restore"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("apolo backup"));
}

#[test]
fn test_missing_spotify_path_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.json"),
        r#"{ "setting": { "spotify_path": "/definitely/not/spotify" } }"#,
    )
    .unwrap();
    apolo(tmp.path())
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/definitely/not/spotify"));
}

#[test]
fn test_backup_records_version_and_copies_apps() {
    let install = Install::new("1.2.3");
    let dir = install.config_dir();
    apolo(&dir).args(["-q", "backup"]).assert().success();

    let config = fs::read_to_string(dir.join("config.json")).unwrap();
    assert!(config.contains("1.2.3"));
    for tree in ["Backup", "Extracted/Raw", "Extracted/Themed"] {
        assert!(dir.join(tree).join("zlink/css/glue.css").is_file(), "{tree}");
    }
}

#[test]
fn test_clear_removes_backup() {
    let install = Install::new("1.2.3");
    let dir = install.config_dir();
    apolo(&dir).args(["-q", "backup"]).assert().success();
    apolo(&dir).args(["-q", "clear"]).assert().success();

    assert!(!dir.join("Backup").exists());
    assert!(!dir.join("Extracted").exists());
    let config = fs::read_to_string(dir.join("config.json")).unwrap();
    assert!(!config.contains("1.2.3"));
}

#[test]
fn test_update_without_theme_fails() {
    let install = Install::new("1.2.3");
    apolo(&install.config_dir())
        .args(["-q", "update"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("theme"));
}

#[test]
fn test_short_version_flag() {
    let tmp = TempDir::new().unwrap();
    apolo(tmp.path())
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("apolo 0.2.0"));
}

#[test]
fn test_patch_error_is_reported_without_failing() {
    let install = Install::new("1.2.3");
    let dir = install.config_dir();
    let theme = dir.join("Themes/ApoloDefault");
    fs::create_dir_all(&theme).unwrap();
    fs::write(theme.join("user.css"), "a{}\n").unwrap();
    fs::remove_file(install.tmp.path().join("spotify/Apps/zlink/css/glue.css")).unwrap();

    apolo(&dir)
        .args(["-q", "update"])
        .assert()
        .success()
        .stderr(predicate::str::contains("glue.css"));
}
