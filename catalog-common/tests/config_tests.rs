//! Tests for configuration resolution
//!
//! Priority order: CLI → ENV → TOML → compiled defaults.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.

use catalog_common::config::{
    log_directives, CatalogConfig, CliOverrides, CompiledDefaults, ConfigFileStatus, TomlConfig,
    DEFAULT_BIND_ADDR, ENV_API_TOKEN, ENV_BIND_ADDR, ENV_DATABASE_PATH, ENV_LOG_LEVEL,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    for name in [ENV_DATABASE_PATH, ENV_BIND_ADDR, ENV_API_TOKEN, ENV_LOG_LEVEL] {
        env::remove_var(name);
    }
}

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(defaults.database_path.ends_with("catalog.db"));
    assert_eq!(defaults.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = CatalogConfig::resolve(CliOverrides::default(), TomlConfig::default());

    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(config.api_token, None, "guard disabled without a token");
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();

    let file = TomlConfig {
        database_path: Some("/srv/catalog/books.db".to_string()),
        api_token: Some("file-token".to_string()),
        ..Default::default()
    };
    let config = CatalogConfig::resolve(CliOverrides::default(), file);

    assert_eq!(config.database_path, PathBuf::from("/srv/catalog/books.db"));
    assert_eq!(config.api_token.as_deref(), Some("file-token"));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_BIND_ADDR, "0.0.0.0:8080");

    let file = TomlConfig {
        bind_addr: Some("127.0.0.1:9000".to_string()),
        ..Default::default()
    };
    let config = CatalogConfig::resolve(CliOverrides::default(), file);

    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_API_TOKEN, "env-token");

    let cli = CliOverrides {
        api_token: Some("cli-token".to_string()),
        ..Default::default()
    };
    let config = CatalogConfig::resolve(cli, TomlConfig::default());

    assert_eq!(config.api_token.as_deref(), Some("cli-token"));
    clear_env();
}

#[test]
#[serial]
fn test_blank_token_disables_guard() {
    clear_env();
    env::set_var(ENV_API_TOKEN, "   ");

    let config = CatalogConfig::resolve(CliOverrides::default(), TomlConfig::default());

    assert_eq!(config.api_token, None);
    clear_env();
}

#[test]
fn test_toml_file_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "bind_addr = \"127.0.0.1:6000\"\nlog_level = \"debug\"\n",
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.bind_addr.as_deref(), Some("127.0.0.1:6000"));
    assert_eq!(config.log_level.as_deref(), Some("debug"));
    assert_eq!(config.database_path, None);
}

#[test]
fn test_missing_or_broken_toml_falls_back() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("absent.toml");
    assert_eq!(TomlConfig::load_or_default(Some(&missing)), TomlConfig::default());

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "bind_addr = [unclosed").unwrap();
    assert!(TomlConfig::load(&broken).is_err());
    assert_eq!(TomlConfig::load_or_default(Some(&broken)), TomlConfig::default());

    assert_eq!(TomlConfig::load_or_default(None), TomlConfig::default());
}

#[test]
fn test_read_reports_file_status() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("absent.toml");
    let (config, status) = TomlConfig::read(Some(&missing));
    assert_eq!(config, TomlConfig::default());
    assert_eq!(status, ConfigFileStatus::Missing(missing.clone()));

    let good = dir.path().join("config.toml");
    std::fs::write(&good, "log_level = \"warn\"\n").unwrap();
    let (config, status) = TomlConfig::read(Some(&good));
    assert_eq!(config.log_level.as_deref(), Some("warn"));
    assert_eq!(status, ConfigFileStatus::Loaded(good.clone()));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "bind_addr = [unclosed").unwrap();
    let (config, status) = TomlConfig::read(Some(&broken));
    assert_eq!(config, TomlConfig::default());
    match status {
        ConfigFileStatus::Ignored(message) => {
            assert!(message.contains("broken.toml"), "message names the file: {}", message)
        }
        other => panic!("Expected Ignored, got {:?}", other),
    }

    assert_eq!(TomlConfig::read(None).1, ConfigFileStatus::NotGiven);
}

#[test]
fn test_log_level_flag_beats_rust_log() {
    assert_eq!(log_directives(Some("debug"), Some("warn"), "debug"), "debug");
    assert_eq!(log_directives(None, Some("catalog_server=trace"), "info"), "catalog_server=trace");
    assert_eq!(log_directives(None, Some("  "), "error"), "error");
    assert_eq!(log_directives(None, None, "info"), "info");
}
