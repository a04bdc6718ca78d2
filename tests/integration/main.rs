//! Integration tests for swcache

mod scenarios;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's config and state
    fn swcache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("swcache");
        cmd.env_remove("SWCACHE_CONFIG")
            .env_remove("SWCACHE_STATE_DIR")
            .env("SWCACHE_PLAIN", "1")
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .arg("--state-dir")
            .arg(temp.path().join("state"));
        cmd
    }

    fn write_config(temp: &TempDir, body: &str) {
        std::fs::write(temp.path().join("config.toml"), body).unwrap();
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline caching controller"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("/favicon.ico"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        swcache(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());

        swcache(&temp)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        write_config(&temp, "[network]\ntimeout_secs = \"soon\"\n");
        swcache(&temp)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn status_without_registration() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No controller registered"));
    }

    #[test]
    fn cache_list_empty_json() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn cache_clear_empty() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache partitions"));
    }

    #[test]
    fn fetch_without_controller_fails() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["fetch", "/about"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No active controller"))
            .stderr(predicate::str::contains("swcache install"));
    }

    #[test]
    fn install_without_origin_fails() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Origin not configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn install_against_unreachable_origin_fails() {
        let temp = TempDir::new().unwrap();
        write_config(
            &temp,
            "[controller]\nprecache = [\"/\"]\n\n[network]\ntimeout_secs = 5\n",
        );
        swcache(&temp)
            .args(["install", "--origin", "http://127.0.0.1:9", "--cache-version", "4"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install failed"));

        assert!(!temp.path().join("state").join("registration.json").exists());
    }

    #[test]
    fn install_rejects_non_http_origin() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["install", "--origin", "ftp://example.com"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported scheme"));
    }

    #[test]
    fn completions_bash() {
        let temp = TempDir::new().unwrap();
        swcache(&temp)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }
}
