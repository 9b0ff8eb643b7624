//! Integration tests for composer-cnb

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn composer_cnb() -> Command {
        let mut cmd = cargo_bin_cmd!("composer-cnb");
        cmd.env_remove("COMPOSER_PATH")
            .env_remove("COMPOSER_GITHUB_OAUTH_TOKEN")
            .env_remove("BP_DEBUG");
        cmd
    }

    #[test]
    fn help_displays() {
        composer_cnb()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("PHP Composer buildpack"));
    }

    #[test]
    fn version_displays() {
        composer_cnb()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("composer-cnb"));
    }

    #[test]
    fn build_requires_layers() {
        composer_cnb().args(["build"]).assert().failure();
    }
}

mod detect_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn detect(app: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("composer-cnb");
        cmd.env_remove("COMPOSER_PATH")
            .env_remove("BP_DEBUG")
            .arg("detect")
            .arg("--app")
            .arg(app)
            .arg("--plan")
            .arg(app.join("plan.toml"));
        cmd
    }

    #[test]
    fn passes_and_writes_plan() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("composer.json"), r#"{"require":{"php":">=5.6"}}"#).unwrap();
        std::fs::write(dir.path().join("composer.lock"), r#"{"platform":{"php":">=7.0"}}"#).unwrap();

        detect(dir.path()).assert().success();

        let plan = std::fs::read_to_string(dir.path().join("plan.toml")).unwrap();
        assert!(plan.contains("[php]"));
        assert!(plan.contains(r#"version = ">=7.0""#));
        assert!(plan.contains(r#"version-source = "composer.lock""#));
        assert!(plan.contains("[php-composer]"));
    }

    #[test]
    fn warns_without_lock() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("composer.json"), r#"{"require":{"php":">=5.6"}}"#).unwrap();

        detect(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Include a 'composer.lock' file"));
    }

    #[test]
    fn composer_path_env_is_honoured() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("htdocs").join("app");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("composer.json"), "{}").unwrap();

        detect(dir.path()).env("COMPOSER_PATH", "app").assert().success();
        assert!(dir.path().join("plan.toml").exists());
    }

    #[test]
    fn no_manifest_exits_100() {
        let dir = TempDir::new().unwrap();

        detect(dir.path()).assert().code(100);
        assert!(!dir.path().join("plan.toml").exists());
    }

    #[test]
    fn bad_buildpack_yml_exits_1() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("composer.json"), "{}").unwrap();
        std::fs::write(dir.path().join("buildpack.yml"), "composer: [not, a, map").unwrap();

        detect(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error:"))
            .stderr(predicate::str::contains("Hint:"));
        assert!(!dir.path().join("plan.toml").exists());
    }

    #[test]
    fn bad_buildpack_yml_without_manifest_exits_100() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("buildpack.yml"), "composer: [not, a, map").unwrap();

        detect(dir.path()).assert().code(100);
    }

    #[test]
    fn malformed_manifest_exits_1() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("composer.json"), "{ nope").unwrap();

        detect(dir.path()).assert().code(1);
    }
}

#[cfg(unix)]
mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct Workspace {
        _dir: TempDir,
        app: PathBuf,
        layers: PathBuf,
    }

    fn workspace() -> Workspace {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("app");
        let layers = dir.path().join("layers");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::create_dir_all(&layers).unwrap();
        std::fs::write(app.join("composer.json"), r#"{"require":{"php":">=7.2"}}"#).unwrap();
        std::fs::write(app.join("composer.lock"), r#"{"platform":{"php":">=7.2"}}"#).unwrap();
        Workspace {
            _dir: dir,
            app,
            layers,
        }
    }

    fn build(ws: &Workspace, php: &str) -> Command {
        let mut cmd = cargo_bin_cmd!("composer-cnb");
        cmd.env_remove("COMPOSER_PATH")
            .env_remove("COMPOSER_GITHUB_OAUTH_TOKEN")
            .env_remove("BP_DEBUG")
            .arg("build")
            .arg("--app")
            .arg(&ws.app)
            .arg("--layers")
            .arg(&ws.layers)
            .arg("--php")
            .arg(php)
            .arg("--composer-phar")
            .arg("composer.phar");
        cmd
    }

    fn layer_metadata(layers: &Path) -> String {
        std::fs::read_to_string(layers.join("php-composer-packages.toml")).unwrap_or_default()
    }

    #[test]
    fn second_build_reuses_layer() {
        let ws = workspace();

        build(&ws, "true")
            .assert()
            .success()
            .stdout(predicate::str::contains("Contributing to layer"));

        let metadata = layer_metadata(&ws.layers);
        assert!(metadata.contains("fingerprint = \""));
        assert!(metadata.contains("cache = true"));

        build(&ws, "false")
            .assert()
            .success()
            .stdout(predicate::str::contains("Reusing cached layer"));
    }

    #[test]
    fn failed_install_exits_1_without_fingerprint() {
        let ws = workspace();

        build(&ws, "false")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error:"));

        let table: toml::Table = layer_metadata(&ws.layers).parse().unwrap_or_default();
        let fingerprint = table
            .get("metadata")
            .and_then(|m| m.get("fingerprint"))
            .and_then(|f| f.as_str())
            .unwrap_or_default();
        assert!(fingerprint.is_empty());
    }

    #[test]
    fn token_is_never_printed() {
        let ws = workspace();

        build(&ws, "true")
            .arg("-v")
            .env("COMPOSER_GITHUB_OAUTH_TOKEN", "ghp_supersecret")
            .assert()
            .success()
            .stderr(predicate::str::contains("[REDACTED]"))
            .stderr(predicate::str::contains("ghp_supersecret").not())
            .stdout(predicate::str::contains("ghp_supersecret").not());
    }
}
