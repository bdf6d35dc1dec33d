use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn launchpad() -> assert_cmd::Command {
    cargo_bin_cmd!("launchpad")
}

const MODEL: &str = r#"
{
  "resources": {
    "postgres": { "type": "postgres.server.v0" },
    "catalogdb": { "type": "postgres.database.v0", "parent": "postgres" },
    "api": {
      "type": "project.v0",
      "containerImage": "myreg.io/api:v1",
      "env": { "ConnectionStrings__catalogdb": "{catalogdb.connectionString}" }
    }
  }
}
"#;

fn write_model(dir: &Path, content: &str) {
    std::fs::write(dir.join("manifest.json"), content).unwrap();
}

// ── Help / Version ──

#[test]
fn shows_help() {
    launchpad()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kustomize manifests"));
}

#[test]
fn shows_version() {
    launchpad()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("launchpad"));
}

#[test]
fn generate_help_lists_options() {
    launchpad()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-path"))
        .stdout(predicate::str::contains("--template-path"))
        .stdout(predicate::str::contains("--non-interactive"));
}

// ── Generate ──

#[test]
fn generate_writes_one_directory_per_manifest_resource() {
    let tmp = TempDir::new().unwrap();
    write_model(tmp.path(), MODEL);

    launchpad()
        .current_dir(tmp.path())
        .args(["generate", "--skip-build", "--output-path", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generation complete"));

    let out = tmp.path().join("out");
    assert!(out.join("api/deployment.yml").exists());
    assert!(out.join("api/service.yml").exists());
    assert!(out.join("api/kustomization.yml").exists());
    assert!(out.join("postgres/postgres-server.yml").exists());
    assert!(out.join("postgres/kustomization.yml").exists());
    assert!(!out.join("catalogdb").exists());

    let deployment = std::fs::read_to_string(out.join("api/deployment.yml")).unwrap();
    assert!(deployment.contains("myreg.io/api:v1"));
    assert!(deployment.contains("ConnectionStrings__catalogdb"));
}

#[test]
fn generate_twice_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    write_model(tmp.path(), MODEL);

    let run = || {
        launchpad()
            .current_dir(tmp.path())
            .args(["generate", "--skip-build", "--output-path", "out"])
            .assert()
            .success();
        std::fs::read_to_string(tmp.path().join("out/api/deployment.yml")).unwrap()
    };

    let first = run();
    std::fs::write(tmp.path().join("out/api/stale.yml"), "old").unwrap();
    let second = run();

    assert_eq!(first, second);
    assert!(!tmp.path().join("out/api/stale.yml").exists());
}

#[test]
fn generate_uses_template_overrides() {
    let tmp = TempDir::new().unwrap();
    write_model(tmp.path(), MODEL);
    std::fs::create_dir(tmp.path().join("templates")).unwrap();
    std::fs::write(
        tmp.path().join("templates/service.yml"),
        "# custom service for {{name}}\n",
    )
    .unwrap();

    launchpad()
        .current_dir(tmp.path())
        .args([
            "generate",
            "--skip-build",
            "--output-path",
            "out",
            "--template-path",
            "templates",
        ])
        .assert()
        .success();

    let service = std::fs::read_to_string(tmp.path().join("out/api/service.yml")).unwrap();
    assert_eq!(service, "# custom service for api\n");
}

#[test]
fn generate_rejects_unsupported_resource_kind() {
    let tmp = TempDir::new().unwrap();
    write_model(
        tmp.path(),
        r#"{ "resources": { "cache": { "type": "redis.v0" } } }"#,
    );

    launchpad()
        .current_dir(tmp.path())
        .args(["generate", "--skip-build", "--output-path", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported resource kind 'redis.v0'"))
        .stderr(predicate::str::contains("project.v0"));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn generate_fails_on_missing_model() {
    let tmp = TempDir::new().unwrap();

    launchpad()
        .current_dir(tmp.path())
        .args(["generate", "--skip-build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest.json"));
}

// ── Build ──

#[test]
fn build_requires_registry() {
    let tmp = TempDir::new().unwrap();
    write_model(
        tmp.path(),
        r#"{ "resources": { "api": { "type": "project.v0", "path": "Api.csproj" } } }"#,
    );

    launchpad()
        .current_dir(tmp.path())
        .args(["build", "--non-interactive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("container registry not set"));
}

#[test]
fn build_without_buildable_projects_succeeds() {
    let tmp = TempDir::new().unwrap();
    write_model(tmp.path(), MODEL);

    launchpad()
        .current_dir(tmp.path())
        .args(["build", "--non-interactive"])
        .assert()
        .success();
}

#[cfg(unix)]
mod fake_build_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const PROJECT_MODEL: &str =
        r#"{ "resources": { "api": { "type": "project.v0", "path": "Api/Api.csproj" } } }"#;

    /// Install `body` as the build program via launchpad.toml.
    fn install_build_tool(dir: &Path, body: &str) {
        let script = dir.join("fake-dotnet");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nif [ \"$1\" = msbuild ]; then echo '{{}}'; exit 0; fi\n{body}\n"),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        std::fs::write(
            dir.join("launchpad.toml"),
            format!(
                "[container]\nregistry = \"myreg.io\"\ntag = \"v1\"\n\n[build]\nprogram = \"{}\"\n",
                script.display()
            ),
        )
        .unwrap();
    }

    #[test]
    fn unknown_registry_exits_with_its_code() {
        let tmp = TempDir::new().unwrap();
        write_model(tmp.path(), PROJECT_MODEL);
        install_build_tool(
            tmp.path(),
            "echo 'error CONTAINER1013: Failed to push' >&2; exit 1",
        );

        // 1013 truncated to the low 8 bits of the exit status.
        launchpad()
            .current_dir(tmp.path())
            .args(["build", "--non-interactive"])
            .assert()
            .code(1013 & 0xff)
            .stderr(predicate::str::contains("CONTAINER1013"));
    }

    #[test]
    fn no_registry_access_non_interactive_exits_with_its_code() {
        let tmp = TempDir::new().unwrap();
        write_model(tmp.path(), PROJECT_MODEL);
        install_build_tool(
            tmp.path(),
            "echo 'error CONTAINER1016: Unable to access the repository' >&2; exit 1",
        );

        launchpad()
            .current_dir(tmp.path())
            .args(["build", "--non-interactive"])
            .assert()
            .code(1000 & 0xff);
    }

    #[test]
    fn unclassified_failure_exits_with_generic_code() {
        let tmp = TempDir::new().unwrap();
        write_model(tmp.path(), PROJECT_MODEL);
        install_build_tool(tmp.path(), "echo 'error CS1002: ; expected'; exit 1");

        launchpad()
            .current_dir(tmp.path())
            .args(["build", "--non-interactive"])
            .assert()
            .code(9999 & 0xff);
    }

    #[test]
    fn duplicate_files_retry_then_generate_with_pushed_image() {
        let tmp = TempDir::new().unwrap();
        write_model(tmp.path(), PROJECT_MODEL);
        install_build_tool(
            tmp.path(),
            "case \"$*\" in\n\
             *ErrorOnDuplicatePublishOutputFiles=false*) echo 'Pushed'; exit 0 ;;\n\
             *) echo 'error NETSDK1152: duplicate output' >&2; exit 1 ;;\n\
             esac",
        );

        launchpad()
            .current_dir(tmp.path())
            .args(["generate", "--non-interactive", "--output-path", "out"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Executing:"))
            .stdout(predicate::str::contains("Pushed myreg.io/api:v1"));

        let deployment =
            std::fs::read_to_string(tmp.path().join("out/api/deployment.yml")).unwrap();
        assert!(deployment.contains("myreg.io/api:v1"));
    }
}
