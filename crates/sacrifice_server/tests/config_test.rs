//! Tests for server configuration loading.

use sacrifice_server::ServerConfig;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(file.path(), content).expect("Failed to write config");
    file
}

#[test]
fn test_defaults() {
    let config = ServerConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 3000);
    assert_eq!(config.bind_address(), "127.0.0.1:3000");

    let policy = config.inactivity_policy();
    assert_eq!(policy.check_interval, Duration::from_secs(60));
    assert_eq!(policy.timeout, Duration::from_secs(600));
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_config("");
    let config = ServerConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_file_overrides() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8080
reaper_interval_secs = 5
inactivity_timeout_secs = 30
"#,
    );
    let config = ServerConfig::from_file(file.path()).expect("Load failed");

    assert_eq!(config.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.inactivity_policy().check_interval, Duration::from_secs(5));
    assert_eq!(config.inactivity_policy().timeout, Duration::from_secs(30));
}

#[test]
fn test_zero_timings_rejected() {
    assert!(ServerConfig::from_toml_str("reaper_interval_secs = 0").is_err());
    assert!(ServerConfig::from_toml_str("inactivity_timeout_secs = 0").is_err());
}

#[test]
fn test_empty_host_rejected() {
    assert!(ServerConfig::from_toml_str("host = \"\"").is_err());
}

#[test]
fn test_printed_config_reloads() {
    let config = ServerConfig::default().with_host("0.0.0.0").with_port(8080);
    let printed = toml::to_string_pretty(&config).expect("config serializes");
    assert!(printed.contains("host = \"0.0.0.0\""));
    assert!(printed.contains("port = 8080"));

    let reloaded = ServerConfig::from_toml_str(&printed).expect("printed config parses");
    assert_eq!(reloaded.bind_address(), "0.0.0.0:8080");
    assert_eq!(reloaded.inactivity_timeout_secs(), config.inactivity_timeout_secs());
}

#[test]
fn test_rejection_names_failing_rule() {
    let err = ServerConfig::from_toml_str("reaper_interval_secs = 0").expect_err("should fail");
    assert!(err.reason.contains("reaper_interval_secs"));
    assert!(err.file.ends_with("config.rs"), "{}", err.file);
    assert!(err.to_string().starts_with("Invalid server config: "));
}

#[test]
fn test_malformed_file_rejected() {
    let file = write_config("port = \"three thousand\"");
    let err = ServerConfig::from_file(file.path()).expect_err("should fail");
    assert!(err.reason.contains("Failed to parse config"));
}

#[test]
fn test_missing_file_rejected() {
    let err = ServerConfig::from_file("/definitely/not/here.toml").expect_err("should fail");
    assert!(err.reason.contains("Failed to read config file"));
}

#[test]
fn test_setters() {
    let config = ServerConfig::default().with_host("0.0.0.0").with_port(9000);
    assert_eq!(config.bind_address(), "0.0.0.0:9000");
    assert!(config.validate().is_ok());
}
