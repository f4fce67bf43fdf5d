use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use setup_fs::{ConfigFormat, Error, NormalizedPath, load_settings, load_settings_or_default};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
struct TestConfig {
    name: String,
    jobs: u32,
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("setup.toml");
    fs::write(&file_path, "name = \"test\"\njobs = 4\n").unwrap();

    let config: TestConfig = load_settings(&NormalizedPath::new(&file_path)).unwrap();
    assert_eq!(config, TestConfig { name: "test".into(), jobs: 4 });
}

#[test]
fn test_load_json() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("setup.json");
    fs::write(&file_path, r#"{"name": "test", "jobs": 2}"#).unwrap();

    let config: TestConfig = load_settings(&NormalizedPath::new(&file_path)).unwrap();
    assert_eq!(config.jobs, 2);
}

#[test]
fn test_load_yaml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("setup.yml");
    fs::write(&file_path, "name: test\njobs: 8\n").unwrap();

    let config: TestConfig = load_settings(&NormalizedPath::new(&file_path)).unwrap();
    assert_eq!(config.jobs, 8);
}

#[test]
fn test_extension_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("SETUP.TOML");
    fs::write(&file_path, "name = \"upper\"\njobs = 1\n").unwrap();

    let config: TestConfig = load_settings(&NormalizedPath::new(&file_path)).unwrap();
    assert_eq!(config.name, "upper");
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(&NormalizedPath::new("a/setup.yml")).unwrap(), ConfigFormat::Yaml);
    assert_eq!(ConfigFormat::from_path(&NormalizedPath::new("setup.json")).unwrap().to_string(), "JSON");
    assert!(ConfigFormat::from_path(&NormalizedPath::new("setup")).is_err());
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("absent.toml"));
    let config: TestConfig = load_settings_or_default(&path).unwrap();
    assert_eq!(config, TestConfig::default());
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("setup.toml");
    fs::write(&file_path, "name = ").unwrap();

    let err = load_settings::<TestConfig>(&NormalizedPath::new(&file_path)).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { ref format, .. } if format == "TOML"));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("setup.ini");
    fs::write(&file_path, "").unwrap();

    let err = load_settings::<TestConfig>(&NormalizedPath::new(&file_path)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
}
