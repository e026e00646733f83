//! Unit tests for config file resolution and graceful degradation
//!
//! Uses serial_test to prevent ENV variable race conditions. Tests that
//! manipulate WKMP_TEST_CONFIG are marked with #[serial].

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use wkmp_common::config::{env_override, load_toml_or_default, ConfigFileResolver, LoggingConfig};
use wkmp_common::Error;

const ENV_VAR: &str = "WKMP_TEST_CONFIG";

#[derive(Debug, Default, Deserialize, PartialEq)]
struct ServiceConfig {
    #[serde(default)]
    port: u16,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolver = ConfigFileResolver::new("dj.toml", ENV_VAR);
    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolver.resolve(Some(&cli));

    assert_eq!(resolved, Some(cli));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_argument() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolver = ConfigFileResolver::new("dj.toml", ENV_VAR);
    assert_eq!(resolver.resolve(None), Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(ENV_VAR, "   ");
    assert_eq!(env_override(ENV_VAR), None);

    let resolver = ConfigFileResolver::new("definitely-not-present-wkmp-test.toml", ENV_VAR);
    assert_eq!(resolver.resolve(None), None);

    env::remove_var(ENV_VAR);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config: ServiceConfig = load_toml_or_default(Some(&path)).unwrap();
    assert_eq!(config, ServiceConfig::default());
}

#[test]
fn test_existing_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 5006\n[logging]\nlevel = \"debug\"").unwrap();

    let config: ServiceConfig = load_toml_or_default(Some(file.path())).unwrap();
    assert_eq!(config.port, 5006);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_broken_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let result: Result<ServiceConfig, Error> = load_toml_or_default(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}
