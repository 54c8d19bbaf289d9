use gcodemeter_core::MachineLimits;
use gcodemeter_settings::Config;
use tempfile::TempDir;

fn limited_config() -> Config {
    let mut config = Config::new();
    config.machine = MachineLimits::new(['X', 'Y', 'Z', 'A'])
        .with_max_feed(vec![5000.0, 5000.0, 1000.0, 3600.0])
        .with_acceleration(vec![200.0, 200.0, 50.0, 720.0]);
    config.processing.arc_divisions = 48;
    config.output.pretty = false;
    config
}

#[test]
fn test_toml_save_and_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested").join("config.toml");

    let config = limited_config();
    config.save_to_file(&path).expect("Failed to save config");
    let loaded = Config::load_from_file(&path).expect("Failed to load config");
    assert_eq!(loaded, config);
}

#[test]
fn test_json_save_and_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.json");

    let config = limited_config();
    config.save_to_file(&path).expect("Failed to save config");
    let loaded = Config::load_from_file(&path).expect("Failed to load config");
    assert_eq!(loaded, config);
}

#[test]
fn test_unknown_extension_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "machine: {}").expect("Failed to write file");

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.is_config_error());
    assert!(Config::new().save_to_file(&path).is_err());
}

#[test]
fn test_malformed_file_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[machine\naxes = ").expect("Failed to write file");

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn test_invalid_limits_rejected_on_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[machine]\naxes = [\"X\", \"Y\"]\nmax_feed = [1000.0]\n",
    )
    .expect("Failed to write file");

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let err = Config::load_from_file(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(!err.is_config_error());
}
