//! Integration tests for setup-graalvm

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the host's config, cache and runner variables
    fn setup_graalvm(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("setup-graalvm");
        cmd.env("SETUP_GRAALVM_CONFIG", home.path().join("config.toml"))
            .env("RUNNER_TOOL_CACHE", home.path().join("tool-cache"))
            .env("RUNNER_TEMP", home.path().join("temp"))
            .env_remove("GITHUB_ENV")
            .env_remove("GITHUB_PATH")
            .env_remove("GITHUB_ACTIONS")
            .env_remove("SETUP_GRAALVM_BASE_URL");
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Provision GraalVM on a build runner"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("setup-graalvm"));
    }

    #[test]
    fn resolve_plain_prints_url() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args([
                "resolve",
                "--java-version",
                "17",
                "--graalvm-version",
                "22.3.0",
                "--platform",
                "linux",
                "--arch",
                "x86_64",
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout(predicate::str::diff(
                "https://github.com/graalvm/graalvm-ce-builds/releases/download/vm-22.3.0/graalvm-ce-java17-linux-amd64-22.3.0.tar.gz\n",
            ));
    }

    #[test]
    fn resolve_json_windows() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args([
                "resolve",
                "--java-version",
                "11",
                "--graalvm-version",
                "21.3.0",
                "--platform",
                "windows",
                "--format",
                "json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"platform\": \"windows\""))
            .stdout(predicate::str::contains(".zip"));
    }

    #[test]
    fn resolve_rejects_unknown_platform() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args([
                "resolve",
                "--java-version",
                "17",
                "--graalvm-version",
                "22.3.0",
                "--platform",
                "plan9",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown platform"));
    }

    #[test]
    fn install_requires_versions() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .env_remove("SETUP_GRAALVM_JAVA_VERSION")
            .env_remove("SETUP_GRAALVM_GRAALVM_VERSION")
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--java-version"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[download]"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["config", "set", "env.graalvm_home", "GRAAL_HOME"])
            .assert()
            .success();

        setup_graalvm(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("GRAAL_HOME"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn cache_list_empty() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached distributions"));
    }

    #[test]
    fn cache_path_follows_runner_tool_cache() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("tool-cache"));
    }

    #[test]
    fn completions_generate() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("setup-graalvm"));
    }

    #[test]
    fn download_failure_is_reported_for_actions() {
        let home = TempDir::new().unwrap();
        setup_graalvm(&home)
            .env("GITHUB_ACTIONS", "true")
            .args([
                "install",
                "--java-version",
                "17",
                "--graalvm-version",
                "22.3.0",
                "--format",
                "shell",
                "--base-url",
                "http://127.0.0.1:9",
            ])
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::"))
            .stderr(predicate::str::contains("Error:"));
    }
}

#[cfg(unix)]
mod install_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ASSET_PATH: &str = "/vm-22.3.0/graalvm-ce-java17-";

    fn setup_graalvm(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("setup-graalvm");
        cmd.env("SETUP_GRAALVM_CONFIG", home.join("config.toml"))
            .env("RUNNER_TOOL_CACHE", home.join("tool-cache"))
            .env("RUNNER_TEMP", home.join("temp"))
            .env_remove("GITHUB_ENV")
            .env_remove("GITHUB_PATH")
            .env_remove("GITHUB_ACTIONS");
        cmd
    }

    /// A GraalVM-shaped tar.gz with both the flat and the macOS bundle layout
    fn distribution() -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for entry in [
            "graalvm-ce-java17-22.3.0/bin/java",
            "graalvm-ce-java17-22.3.0/Contents/Home/bin/java",
        ] {
            let contents = b"#!/bin/sh\necho graalvm\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, entry, &contents[..]).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Mock release server answering exactly `downloads` asset requests
    async fn release_server(downloads: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        let host = std::env::consts::ARCH;
        let arch = if host == "aarch64" || host == "arm64" {
            "aarch64"
        } else {
            "amd64"
        };
        let platform = if cfg!(target_os = "macos") {
            "darwin"
        } else {
            "linux"
        };

        Mock::given(method("GET"))
            .and(path(format!(
                "{}{}-{}-22.3.0.tar.gz",
                ASSET_PATH, platform, arch
            )))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(distribution()))
            .expect(downloads)
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn install(home: &Path, base_url: &str) -> assert_cmd::assert::Assert {
        setup_graalvm(home)
            .args([
                "install",
                "--java-version",
                "17",
                "--graalvm-version",
                "22.3.0",
                "--format",
                "shell",
                "--base-url",
                base_url,
            ])
            .assert()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn install_then_reuse_cache() {
        let home = TempDir::new().unwrap();
        let mock_server = release_server(1).await;

        install(home.path(), &mock_server.uri())
            .success()
            .stdout(predicate::str::contains("export JAVA_HOME="))
            .stdout(predicate::str::contains("export GRAALVM_HOME="))
            .stdout(predicate::str::contains("/bin':\"$PATH\""))
            .stdout(predicate::str::contains("tool-cache/GraalVM/java17-"));

        install(home.path(), &mock_server.uri())
            .success()
            .stdout(predicate::str::contains("export JAVA_HOME="));

        setup_graalvm(home.path())
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("java17-"));

        mock_server.verify().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn install_publishes_actions_files() {
        let home = TempDir::new().unwrap();
        let env_file = home.path().join("github_env");
        let path_file = home.path().join("github_path");
        let mock_server = release_server(1).await;

        setup_graalvm(home.path())
            .env("GITHUB_ENV", &env_file)
            .env("GITHUB_PATH", &path_file)
            .args([
                "install",
                "--java-version",
                "17",
                "--graalvm-version",
                "22.3.0",
                "--base-url",
                &mock_server.uri(),
            ])
            .assert()
            .success();

        let env = std::fs::read_to_string(&env_file).unwrap();
        assert!(env.contains("JAVA_HOME="));
        assert!(env.contains("GRAALVM_HOME="));

        let path = std::fs::read_to_string(&path_file).unwrap();
        assert!(path.trim_end().ends_with("bin"));
    }
}
