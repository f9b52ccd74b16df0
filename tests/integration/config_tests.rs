use dupescan::config::Config;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = Config {
        concurrency: 16,
        detail: 500,
        max_size: Some(1 << 30),
        patterns: vec![r"\.mp4$".into(), r"\.mov$".into()],
    };

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_empty_object_gives_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{}").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_unknown_fields_are_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"detail": 5, "theme": "dark"}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.detail, 5);
    assert_eq!(config.concurrency, Config::default().concurrency);
}

#[test]
fn test_wrong_type_is_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"concurrency": "lots"}"#).unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_config_path_is_json() {
    if let Ok(path) = Config::config_path() {
        assert_eq!(path.file_name().unwrap(), "config.json");
    }
}
