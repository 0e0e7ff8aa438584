use std::io::Write;

use signalbus::config::{load_config, parse_config, AppConfig, ConfigError};

#[test]
fn test_empty_config_uses_defaults() {
    let config = parse_config("").unwrap();

    assert_eq!(config, AppConfig::default());
    assert_eq!(config.collector.interval_seconds, 1.0);
    assert_eq!(config.collector.response_timeout_seconds, None);
    assert_eq!(config.demo.publishers, vec!["cpu".to_string(), "memory".to_string()]);
    assert_eq!(config.demo.rounds, 0);
}

#[test]
fn test_partial_config_overrides_only_given_fields() {
    let config = parse_config(
        r#"
        [collector]
        interval_seconds = 2.5

        [demo]
        publishers = ["cpu"]
        rounds = 3
        "#,
    )
    .unwrap();

    assert_eq!(config.collector.interval_seconds, 2.5);
    assert_eq!(config.collector.response_timeout_seconds, None);
    assert_eq!(config.demo.publishers, vec!["cpu".to_string()]);
    assert_eq!(config.demo.rounds, 3);
}

#[test]
fn test_invalid_values_are_all_reported() {
    let err = parse_config(
        r#"
        [collector]
        interval_seconds = -1.0
        response_timeout_seconds = -0.5

        [demo]
        publishers = ["a", "a", ""]
        "#,
    )
    .unwrap_err();

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 4, "{errors:?}");
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = parse_config("[demo]\nrounds = [").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_load_config_reads_file() {
    let name = format!("signalbus-config-{}.toml", uuid::Uuid::new_v4());
    let path = std::env::temp_dir().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[demo]\nrounds = 7").unwrap();
    drop(file);

    let config = load_config(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.demo.rounds, 7);
    assert_eq!(config.collector, Default::default());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_config(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
