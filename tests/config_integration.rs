//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use serial_test::serial;
use volray::config::AppConfig;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("VOLRAY_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    println!("Window title: {}", config.window.title);
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("VOLRAY_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_env_volume_dims() {
    std::env::set_var("VOLRAY_VOLUME__WIDTH", "128");
    std::env::set_var("VOLRAY_VOLUME__DEPTH", "64");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.volume.width, 128);
    assert_eq!(config.volume.depth, 64);
    std::env::remove_var("VOLRAY_VOLUME__WIDTH");
    std::env::remove_var("VOLRAY_VOLUME__DEPTH");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("VOLRAY_WINDOW__TITLE");

    // Debug: print current dir and check if files exist
    let cwd = std::env::current_dir().unwrap();
    println!("Current dir: {:?}", cwd);
    println!(
        "config/default.toml exists: {}",
        cwd.join("config/default.toml").exists()
    );

    let config = AppConfig::load().unwrap();
    println!("Window title from file: {}", config.window.title);
    assert_eq!(config.rendering.step_count, 256);
    assert!(config.volume.path.is_none());
}

#[test]
fn test_toml_round_trip() {
    let config = AppConfig::default();
    let serialized = toml::to_string(&config).unwrap();
    let restored: AppConfig = toml::from_str(&serialized).unwrap();
    assert_eq!(restored.window.title, config.window.title);
    assert_eq!(restored.camera.initial_radius, config.camera.initial_radius);
    assert_eq!(restored.rendering.iso_color_1, config.rendering.iso_color_1);
    assert_eq!(restored.volume.path, config.volume.path);
}

#[test]
#[serial]
fn test_partial_section_toml() {
    // A user file only needs the keys it overrides
    let dir = std::env::temp_dir().join("volray_config_test");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("default.toml"),
        "[camera]\ninitial_radius = 2.5\nmin_radius = 1.0\nmax_radius = 10.0\nfov = 60.0\nnear = 0.1\nfar = 100.0\n",
    )
    .unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.camera.initial_radius, 2.5);
    assert_eq!(config.camera.fov, 60.0);
    // Untouched sections fall back to defaults
    assert_eq!(config.window.width, 1280);
}
