//! Integration tests for the make-dto binary

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn make_dto(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("make-dto");
    // piped stdin keeps the binary out of interactive mode
    cmd.current_dir(dir.path()).write_stdin("");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("make"))
        .stdout(predicate::str::contains("publish-stub"));
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_make_creates_file_in_default_directory() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .args(["make", "Admin/UserProfile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created successfully."));

    let path = temp.path().join("src/dto/admin/user_profile.rs");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("pub struct UserProfileSchema => UserProfile"));
    assert!(contents.contains("dto::admin::user_profile::UserProfile"));
}

#[test]
fn test_make_respects_flags() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .args([
            "make",
            "create_order",
            "--output-dir",
            "app/types",
            "--namespace",
            "app::types",
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(temp.path().join("app/types/create_order.rs")).unwrap();
    assert!(contents.contains("CreateOrderSchema => CreateOrder"));
    assert!(contents.contains("app::types::create_order::CreateOrder"));
}

#[test]
fn test_make_reads_scaffold_config() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("dto.yaml"),
        "scaffold:\n  namespace: api::dto\n  output_dir: api/dto\n",
    )
    .unwrap();

    make_dto(&temp)
        .args(["--config", "dto.yaml", "make", "Ping"])
        .assert()
        .success();

    let contents = fs::read_to_string(temp.path().join("api/dto/ping.rs")).unwrap();
    assert!(contents.contains("api::dto::ping::Ping"));
}

#[test]
fn test_make_keeps_existing_file_without_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("src/dto/invoice.rs");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "hand written").unwrap();

    make_dto(&temp)
        .args(["make", "Invoice"])
        .assert()
        .success()
        .stderr(predicate::str::contains("--force"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "hand written");
}

#[test]
fn test_make_force_overwrites() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("src/dto/invoice.rs");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "hand written").unwrap();

    make_dto(&temp)
        .args(["make", "Invoice", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created successfully."));

    assert!(fs::read_to_string(&path).unwrap().contains("InvoiceSchema"));
}

#[test]
fn test_make_rejects_invalid_name() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .args(["make", "user-profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid DTO name"));

    assert!(!temp.path().join("src").exists());
}

#[test]
fn test_make_without_name_fails_when_not_interactive() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .arg("make")
        .assert()
        .failure()
        .stderr(predicate::str::contains("A DTO name is required"));
}

#[test]
fn test_make_reports_missing_stub() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .args(["make", "Invoice", "--stub", "stubs/none.stub"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stub file not found"));
}

#[test]
fn test_make_uses_published_custom_stub() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp).arg("publish-stub").assert().success();

    let stub = temp.path().join("stubs/dto.stub");
    fs::write(&stub, "// custom {{ class }} in {{ namespace }}\n").unwrap();

    make_dto(&temp)
        .args(["make", "Invoice", "--stub", "stubs/dto.stub"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(temp.path().join("src/dto/invoice.rs")).unwrap(),
        "// custom Invoice in dto::invoice\n"
    );
}

#[test]
fn test_publish_stub_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    make_dto(&temp)
        .arg("publish-stub")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stub published"));

    make_dto(&temp)
        .arg("publish-stub")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    make_dto(&temp)
        .args(["publish-stub", "--force"])
        .assert()
        .success();
}
