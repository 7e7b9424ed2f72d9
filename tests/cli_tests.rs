//! End-to-end tests of the `shopledger` binary.

mod harness;

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use chrono::{Duration, Utc};
use predicates::prelude::*;
use shopledger::adapter::outbound::sqlite::SqliteStatsLogStore;
use shopledger::domain::stats::{MetricType, NewSnapshot};

use harness::temp_db::TempDb;

fn write_config(dir: &Path, db: &TempDb, extra: &str) -> std::path::PathBuf {
    let path = dir.join("shopledger.toml");
    let contents = format!(
        "database = {:?}\n\n[logging]\nlevel = \"warn\"\n{extra}",
        db.url()
    );
    fs::write(&path, contents).expect("write config");
    path
}

fn shopledger(config: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("shopledger");
    cmd.env_remove("SHOPLEDGER_DATABASE")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

fn seed(db: &TempDb, ages_in_days: &[i64]) {
    let store = SqliteStatsLogStore::new(db.pool().clone());
    let mut conn = db.pool().get().unwrap();
    let now = Utc::now();
    let mut latest = None;
    for (i, age) in ages_in_days.iter().enumerate() {
        let snapshot = NewSnapshot::following(
            MetricType::sales(),
            latest.as_ref(),
            (i as i64 + 1) * 10,
            now - Duration::days(*age),
        );
        latest = Some(store.append_with_conn(&mut conn, &snapshot).unwrap());
    }
}

#[test]
fn stats_cleanup_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-cleanup");
    seed(&db, &[40, 20, 1]);
    let config = write_config(dir.path(), &db, "");

    shopledger(&config)
        .args(["stats", "cleanup", "--days", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Before         3"))
        .stdout(predicate::str::contains("After          2"))
        .stdout(predicate::str::contains("Deleted        1"));
}

#[test]
fn stats_cleanup_defaults_to_configured_retention() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-retention");
    seed(&db, &[10, 3]);
    let config = write_config(dir.path(), &db, "\n[stats]\nretention_days = 5\n");

    shopledger(&config)
        .args(["stats", "cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 days"))
        .stdout(predicate::str::contains("Deleted        1"));
}

#[test]
fn stats_cleanup_rejects_zero_days() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-zero-days");
    let config = write_config(dir.path(), &db, "");

    shopledger(&config)
        .args(["stats", "cleanup", "--days", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("days"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-bad-config");
    let config = write_config(dir.path(), &db, "\n[locks]\nwait_secs = 0\n");

    shopledger(&config)
        .args(["stats", "cleanup"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("wait_secs"));
}

#[test]
fn missing_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();

    shopledger(&dir.path().join("absent.toml"))
        .args(["stats", "show"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn order_status_change_records_stats() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-order");
    let config = write_config(dir.path(), &db, "");

    shopledger(&config)
        .args(["order", "create", "--customer", "7", "--item", "1:2:10.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order created"));
    shopledger(&config)
        .args(["order", "create", "--customer", "8", "--item", "2:1:5.25", "--item", "3:1:1.00"])
        .assert()
        .success();

    shopledger(&config)
        .args(["order", "status", "2", "cancelled"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order stats refreshed"));

    let output = shopledger(&config)
        .args(["stats", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let latest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let latest = latest.as_array().unwrap();
    let value_of = |metric: &str| {
        latest
            .iter()
            .find(|entry| entry["metric"] == metric)
            .and_then(|entry| entry["latest"]["current_value"].as_i64())
    };
    assert_eq!(value_of("order_count"), Some(2));
    assert_eq!(value_of("sales"), Some(20));
}

#[test]
fn order_status_rejects_unknown_status() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-bad-status");
    let config = write_config(dir.path(), &db, "");

    shopledger(&config)
        .args(["order", "status", "1", "refunded"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refunded"));
}

#[test]
fn order_create_rejects_overflowing_total() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-overflow");
    let config = write_config(dir.path(), &db, "");
    let max = "79228162514264337593543950335";

    shopledger(&config)
        .args(["order", "create", "--customer", "1"])
        .args(["--item", &format!("1:1:{max}"), "--item", &format!("2:1:{max}")])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("overflows"));
}

#[test]
fn stats_update_records_explicit_value_then_skips_repeat() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-update");
    let config = write_config(dir.path(), &db, "");

    shopledger(&config)
        .args(["stats", "update", "--metric", "visits", "--value", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot recorded"));
    shopledger(&config)
        .args(["stats", "update", "--metric", "visits", "--value", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50.00"));
    shopledger(&config)
        .args(["stats", "update", "--metric", "visits", "--value", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Value unchanged"));

    shopledger(&config)
        .args(["stats", "show", "--metric", "visits"])
        .assert()
        .success()
        .stdout(predicate::str::contains("History: visits"))
        .stdout(predicate::str::contains("150"));
}

#[test]
fn stats_update_recomputes_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    let db = TempDb::create("cli-recompute");
    let config = write_config(dir.path(), &db, "");

    shopledger(&config)
        .args(["order", "create", "--customer", "1", "--item", "1:4:2.50"])
        .assert()
        .success();
    shopledger(&config)
        .args(["stats", "update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("order_count    4"))
        .stdout(predicate::str::contains("sales          10"));
}
