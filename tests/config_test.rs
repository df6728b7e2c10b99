//! Integration tests for Settings loading with layered precedence.
//!
//! Precedence: defaults → global file → explicit file → FISHBONE_* env.
//!
//! Note: these tests pass their own global file (or none) through
//! `Settings::load_from`, so a config in the user's home never leaks in.
//! Env-var overrides are exercised in a single test to avoid races on
//! process env.

use std::fs;

use tempfile::TempDir;

use fishbone::application::ApplicationError;
use fishbone::config::Settings;
use fishbone::domain::Viewport;

#[test]
fn given_defaults_when_inspecting_then_match_editor_conventions() {
    let settings = Settings::default();

    assert_eq!(settings.server_url, "http://localhost:8080");
    assert_eq!(settings.root_bone_name, "New Bone");
    assert_eq!(settings.child_bone_name, "New Child Bone");
    assert_eq!(settings.created_by, "user");
    assert_eq!(Viewport::from(settings.viewport), Viewport::new(900.0, 600.0));
}

#[test]
fn given_partial_file_when_load_then_overrides_only_named_keys() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fishbone.toml");
    fs::write(
        &path,
        r#"
server_url = "https://diagrams.example.org"
created_by = "quality-team"

[viewport]
width = 1280.0
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(None, Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.server_url, "https://diagrams.example.org");
    assert_eq!(settings.created_by, "quality-team");
    assert_eq!(settings.root_bone_name, "New Bone");
    assert_eq!(settings.viewport.width, 1280.0);
    assert_eq!(settings.viewport.height, 600.0);
    assert_eq!(settings.editor_defaults().created_by, "quality-team");
}

#[test]
fn given_global_and_explicit_files_when_load_then_explicit_wins_per_key() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("global.toml");
    let explicit = dir.path().join("project.toml");
    fs::write(
        &global,
        "server_url = \"https://global.example.org\"\nroot_bone_name = \"Cause\"\n",
    )
    .unwrap();
    fs::write(&explicit, "server_url = \"https://project.example.org\"\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&global), Some(&explicit)).expect("load settings");

    // Assert
    assert_eq!(settings.server_url, "https://project.example.org");
    assert_eq!(settings.root_bone_name, "Cause");
    assert_eq!(settings.created_by, "user");
}

#[test]
fn given_no_files_when_load_then_defaults() {
    let settings = Settings::load_from(None, None).expect("load settings");

    assert_eq!(settings.server_url, Settings::default().server_url);
    assert_eq!(settings.viewport, Settings::default().viewport);
}

#[test]
fn given_missing_explicit_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load_from(None, Some(&dir.path().join("absent.toml")));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_toml_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "server_url = ").unwrap();

    let err = Settings::load_from(None, Some(&path)).unwrap_err();

    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn given_non_positive_viewport_when_load_then_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fishbone.toml");
    fs::write(&path, "[viewport]\nheight = 0.0\n").unwrap();

    let result = Settings::load_from(None, Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_env_override_when_load_then_env_wins_over_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fishbone.toml");
    fs::write(&path, "child_bone_name = \"From file\"\ntimeout_secs = 3\n").unwrap();
    std::env::set_var("FISHBONE_CHILD_BONE_NAME", "From env");

    // Act
    let settings = Settings::load_from(None, Some(&path));
    std::env::remove_var("FISHBONE_CHILD_BONE_NAME");

    // Assert
    let settings = settings.expect("load settings");
    assert_eq!(settings.child_bone_name, "From env");
    assert_eq!(settings.timeout_secs, 3);
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips() {
    let settings = Settings::default();

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed, settings);
}
