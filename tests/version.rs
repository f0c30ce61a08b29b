//! Integration test: Verify binary prints correct version

use std::process::Command;

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_hexpager"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Expected output to contain version, but got: {}",
        stdout
    );
}

#[test]
fn missing_file_is_reported_without_a_terminal() {
    let output = Command::new(env!("CARGO_BIN_EXE_hexpager"))
        .arg("/nonexistent/hexpager-test.bin")
        .env("HEXPAGER_CONFIG", "/nonexistent/config.toml")
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
}
