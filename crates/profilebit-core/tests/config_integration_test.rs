use profilebit_core::{ConfigError, ConfigManager, ProfileBitConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_serialization() {
    let config = ProfileBitConfig::default();

    let toml = toml::to_string(&config).unwrap();
    let from_toml: ProfileBitConfig = toml::from_str(&toml).unwrap();
    assert_eq!(config.cache.namespace, from_toml.cache.namespace);
    assert_eq!(
        config.cache.always_invalidate_on_render,
        from_toml.cache.always_invalidate_on_render
    );
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let config: ProfileBitConfig = toml::from_str(
        r#"
        [cache]
        always_invalidate_on_render = false
        "#,
    )
    .unwrap();

    assert!(!config.cache.always_invalidate_on_render);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.namespace, "elementorbbprofilecompletion");
    assert_eq!(config.logging.format, "pretty");
}

#[test]
fn test_config_file_persistence() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    ConfigManager::create_default_config(&config_path).unwrap();
    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[cache]"));
    assert!(content.contains("elementorbbprofilecompletion"));
}

#[test]
fn test_from_path_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigManager::from_path(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_from_path_rejects_malformed_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[cache\nnamespace = ").unwrap();

    let result = ConfigManager::from_path(&config_path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}
