use crate::common::{TestWorkspace, assert_contains, init_test_logging};

#[test]
fn test_config_show_reports_environment_source() {
    init_test_logging();
    crate::test_log!("TEST START: test_config_show_reports_environment_source");

    let workspace = TestWorkspace::new();
    std::fs::write(&workspace.user_config, "[connection]\nuser = \"DEV\"\n").unwrap();

    let output = workspace
        .qbuild()
        .env("QBUILD_HOST", "ibmi.example.com")
        .args(["config", "show", "--json"])
        .output()
        .expect("Failed to run qbuild config show");
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    let host = rows.iter().find(|r| r["key"] == "connection.host").unwrap();
    assert_eq!(host["value"], "ibmi.example.com");
    assert_eq!(host["source"], "environment (QBUILD_HOST)");

    let user = rows.iter().find(|r| r["key"] == "connection.user").unwrap();
    assert_eq!(user["value"], "DEV");
    assert_contains(host["source"].as_str().unwrap(), "QBUILD_HOST");
    crate::test_log!("TEST PASS: test_config_show_reports_environment_source");
}

#[test]
fn test_check_flags_missing_project() {
    init_test_logging();
    let workspace = TestWorkspace::new();

    let output = workspace
        .qbuild()
        .env("QBUILD_HOST", "ibmi.example.com")
        .arg("check")
        .output()
        .expect("Failed to run qbuild check");

    assert_eq!(output.status.code(), Some(1));
    assert_contains(&String::from_utf8_lossy(&output.stdout), "no project configuration found");
}
