use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use shopledger::error::{ConfigError, Error};
use shopledger::infrastructure::config::settings::Config;
use shopledger::infrastructure::config::{LockBackend, LogFormat};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn write_temp_config(contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let suffix = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!("shopledger-config-test-{nanos}-{suffix}.toml"));
    fs::write(&path, contents).expect("write temp config");
    path
}

fn expect_invalid(toml: &str, expected_field: &str) {
    match Config::parse_toml(toml) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, expected_field);
        }
        Err(err) => panic!("Expected invalid {expected_field}, got {err}"),
        Ok(_) => panic!("Expected invalid {expected_field}, config loaded"),
    }
}

#[test]
fn empty_config_uses_defaults() {
    let config = Config::parse_toml("").unwrap();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(config.stats.retention_days, 30);
    assert_eq!(config.stats.aggregate_cache_ttl(), Duration::from_secs(60));
    assert_eq!(config.stats.cleanup_interval(), Duration::from_secs(86_400));
    assert_eq!(config.locks.backend, LockBackend::Memory);
    assert_eq!(config.locks.timeouts().wait, Duration::from_secs(5));
    assert_eq!(config.locks.timeouts().hold, Duration::from_secs(10));
    assert_eq!(config.locks.poll_interval(), Duration::from_millis(250));
}

#[test]
fn full_config_is_parsed() {
    let toml = r#"
[logging]
level = "shopledger=debug"
format = "json"

[stats]
retention_days = 7
aggregate_cache_ttl_secs = 0
cleanup_interval_secs = 3600

[locks]
backend = "sqlite"
database = "/var/lib/shopledger/locks.db"
wait_secs = 2
hold_secs = 30
poll_interval_ms = 50
"#;
    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);
    let config = result.unwrap();

    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.stats.retention_days, 7);
    assert_eq!(config.stats.aggregate_cache_ttl(), Duration::ZERO);
    assert_eq!(config.locks.backend, LockBackend::Sqlite);
    assert_eq!(config.locks.database, "/var/lib/shopledger/locks.db");
    assert_eq!(config.locks.timeouts().hold, Duration::from_secs(30));
    assert_eq!(config.locks.poll_interval(), Duration::from_millis(50));
}

#[test]
fn config_rejects_zero_retention() {
    expect_invalid("[stats]\nretention_days = 0\n", "retention_days");
}

#[test]
fn config_rejects_zero_cleanup_interval() {
    expect_invalid("[stats]\ncleanup_interval_secs = 0\n", "cleanup_interval_secs");
}

#[test]
fn config_rejects_zero_lock_timeouts() {
    expect_invalid("[locks]\nwait_secs = 0\n", "locks");
    expect_invalid("[locks]\nhold_secs = 0\n", "locks");
    expect_invalid("[locks]\npoll_interval_ms = 0\n", "poll_interval_ms");
}

#[test]
fn config_rejects_unknown_lock_backend() {
    let result = Config::parse_toml("[locks]\nbackend = \"redis\"\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let result = Config::load("/nonexistent/shopledger.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}
