//! CLI integration tests

use std::process::Command;

fn hpp(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hpp"))
        .args(args)
        .env_remove("HPP_USER")
        .env_remove("HPP_API_URL")
        // Keep a developer's ~/.config/hpp/config.json out of the picture
        .env("HOME", std::env::temp_dir().join("hpp-cli-tests-home"))
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = hpp(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("House Price Predictor"),
        "Should show app name"
    );
    for command in ["predict", "history", "show", "delete", "dashboard", "model"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("--user"), "Should show user option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = hpp(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("hpp"), "Should show binary name");
}

/// Test predict subcommand help lists every house attribute
#[test]
fn test_predict_help() {
    let output = hpp(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    for flag in [
        "--area",
        "--bedrooms",
        "--bathrooms",
        "--stories",
        "--parking",
        "--mainroad",
        "--guestroom",
        "--basement",
        "--hotwaterheating",
        "--airconditioning",
        "--prefarea",
        "--furnishingstatus",
    ] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
    assert!(stdout.contains("semi-furnished"), "Should list furnishing choices");
}

/// Test history subcommand help
#[test]
fn test_history_help() {
    let output = hpp(&["history", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "History help should succeed");
    assert!(stdout.contains("--page"), "Should show page option");
}

/// Test delete requires an id
#[test]
fn test_delete_requires_id() {
    let output = hpp(&["delete"]);
    assert!(!output.status.success(), "Delete without id should fail");
}

/// Test out-of-range values are rejected before any request
#[test]
fn test_predict_rejects_out_of_range_area() {
    let output = hpp(&[
        "--user",
        "alice",
        "predict",
        "--area",
        "10",
        "--bedrooms",
        "3",
        "--bathrooms",
        "2",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("--area"), "Should name the bad option");
}

/// Test a missing user id is reported
#[test]
fn test_history_requires_user() {
    let output = hpp(&["--api-url", "http://127.0.0.1:9", "history"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("HPP_USER"), "Should explain how to set the user");
}
