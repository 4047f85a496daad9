use crate::common::{TestWorkspace, assert_contains, assert_path_exists, init_test_logging};
use std::process::Command;

#[test]
fn test_qbuild_help_includes_description() {
    init_test_logging();
    crate::test_log!("TEST START: test_qbuild_help_includes_description");

    let output = Command::new(env!("CARGO_BIN_EXE_qbuild"))
        .arg("--help")
        .output()
        .expect("Failed to run qbuild --help");

    assert!(output.status.success(), "qbuild --help failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "compile remotely");
    crate::test_log!("TEST PASS: test_qbuild_help_includes_description");
}

#[test]
fn test_init_creates_config_and_overlay() {
    init_test_logging();
    let workspace = TestWorkspace::new();

    let output = workspace.qbuild().arg("init").output().expect("Failed to run qbuild init");
    assert!(output.status.success());
    assert_path_exists(&workspace.root().join(".qbuild/project.json"));
    let overlay = std::fs::read_to_string(workspace.root().join(".env")).unwrap();
    assert_contains(&overlay, "BUILDLIB=");
}

#[test]
fn test_actions_preview_for_rpgle() {
    init_test_logging();
    let workspace = TestWorkspace::new();
    workspace.qbuild().arg("init").output().expect("Failed to run qbuild init");
    let file = workspace.file("QRPGLESRC/customer.rpgle", "**free\n");

    let output = workspace
        .qbuild()
        .arg("actions")
        .arg(&file)
        .arg("--json")
        .output()
        .expect("Failed to run qbuild actions");
    assert!(output.status.success());

    let previews: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let first = &previews[0];
    assert_eq!(first["name"], "CRTBNDRPG");
    assert_eq!(
        first["command"],
        "CRTBNDRPG PGM(MYLIB/CUSTOMER) SRCFILE(MYLIB/QRPGLESRC) SRCMBR(CUSTOMER) OPTION(*EVENTF) DBGVIEW(*SOURCE)"
    );
    assert_eq!(first["library_list"], serde_json::json!(["MYLIB", "QTEMP", "QGPL"]));
}

#[test]
fn test_run_with_oversized_name_aborts_before_connecting() {
    init_test_logging();
    let workspace = TestWorkspace::new();
    let file = workspace.file("QRPGLESRC/averyverylongname.rpgle", "**free\n");

    let output = workspace
        .qbuild()
        .env("QBUILD_HOST", "ibmi.invalid")
        .arg("run")
        .arg(&file)
        .arg("--yes")
        .output()
        .expect("Failed to run qbuild run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "QB-E100");
    // Identifiers are checked before the configuration is looked for.
    assert!(!workspace.root().join(".qbuild").exists());
}

#[test]
fn test_run_without_host_fails() {
    init_test_logging();
    let workspace = TestWorkspace::new();
    let file = workspace.file("QRPGLESRC/a.rpgle", "**free\n");

    let output = workspace
        .qbuild()
        .arg("run")
        .arg(&file)
        .arg("--yes")
        .output()
        .expect("Failed to run qbuild run");

    assert!(!output.status.success());
    assert_contains(&String::from_utf8_lossy(&output.stderr), "no remote host configured");
}
