//! Handlers for the `stats` command group.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use crate::cli::output;
use crate::cli::{CleanupArgs, ShowArgs, UpdateArgs};
use crate::domain::stats::{MetricType, StatsLogEntry};
use crate::error::Result;
use crate::infrastructure::bootstrap::Ledger;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Previous")]
    previous: String,
    #[tabled(rename = "Change %")]
    change_rate: String,
    #[tabled(rename = "Recorded")]
    recorded_at: String,
}

impl SnapshotRow {
    fn from_entry(entry: &StatsLogEntry) -> Self {
        Self {
            metric: entry.metric_type.to_string(),
            current: entry.current_value.to_string(),
            previous: entry.previous_value.to_string(),
            change_rate: entry.change_rate.to_string(),
            recorded_at: entry.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    fn empty(metric: &MetricType) -> Self {
        Self {
            metric: metric.to_string(),
            current: "-".into(),
            previous: "-".into(),
            change_rate: "-".into(),
            recorded_at: "-".into(),
        }
    }
}

#[derive(Serialize)]
struct LatestSnapshot<'a> {
    metric: &'a MetricType,
    latest: Option<&'a StatsLogEntry>,
}

/// Execute `stats cleanup`.
pub fn cleanup(config: &Config, args: &CleanupArgs) -> Result<()> {
    let days = args.days.unwrap_or(config.stats.retention_days);
    let ledger = Ledger::build(config)?;
    let report = ledger.retention.cleanup(days)?;

    output::section("Stats cleanup");
    output::key_value("Retention", format!("{days} days"));
    output::key_value("Cutoff", report.cutoff.format("%Y-%m-%d %H:%M:%S UTC"));
    output::key_value("Before", report.before_count);
    output::key_value("After", report.after_count);
    output::key_value("Deleted", report.deleted_count);
    println!();
    output::ok(&format!("Deleted {} snapshot(s)", report.deleted_count));
    Ok(())
}

/// Execute `stats update`.
pub fn update(config: &Config, args: &UpdateArgs) -> Result<()> {
    let ledger = Ledger::build(config)?;

    if let (Some(metric), Some(value)) = (&args.metric, args.value) {
        let metric = MetricType::try_new(metric.as_str())?;
        let update = ledger.stats.update_stats(&metric, value)?;

        output::section(&format!("Stats update: {metric}"));
        output::key_value("Current", update.current_value);
        output::key_value("Previous", update.previous_value);
        output::key_value("Change %", update.change_rate);
        println!();
        if update.skipped {
            output::warn("Value unchanged, nothing recorded");
        } else {
            output::ok("Snapshot recorded");
        }
        return Ok(());
    }

    let mut conn = ledger.pool.get()?;
    ledger.trigger.invalidate();
    let refresh = conn.immediate_transaction(|conn| ledger.trigger.refresh(conn))?;

    output::section("Stats update");
    output::key_value(MetricType::ORDER_COUNT, refresh.order_count);
    output::key_value(MetricType::SALES, refresh.sales);
    println!();
    output::ok("Aggregates recorded");
    Ok(())
}

/// Execute `stats show`.
pub fn show(config: &Config, args: &ShowArgs) -> Result<()> {
    let ledger = Ledger::build(config)?;

    if let Some(metric) = &args.metric {
        let metric = MetricType::try_new(metric.as_str())?;
        let history = ledger.stats.history(&metric, args.limit)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&history)?);
            return Ok(());
        }

        output::section(&format!("History: {metric}"));
        if history.is_empty() {
            output::note("No snapshots recorded");
        } else {
            output::table(history.iter().map(SnapshotRow::from_entry));
        }
        return Ok(());
    }

    let latest = ledger.stats.latest_all()?;
    if args.json {
        let view: Vec<LatestSnapshot<'_>> = latest
            .iter()
            .map(|(metric, entry)| LatestSnapshot {
                metric,
                latest: entry.as_ref(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    output::section("Latest snapshots");
    output::table(latest.iter().map(|(metric, entry)| {
        entry
            .as_ref()
            .map_or_else(|| SnapshotRow::empty(metric), SnapshotRow::from_entry)
    }));
    Ok(())
}

/// Execute `stats schedule`. Runs until Ctrl-C.
pub async fn schedule(config: &Config) -> Result<()> {
    let ledger = Ledger::build(config)?;
    let scheduler = Arc::new(ledger.cleanup_scheduler(config));

    output::note(&format!(
        "Cleaning up snapshots older than {} days every {}s (Ctrl-C to stop)",
        config.stats.retention_days, config.stats.cleanup_interval_secs
    ));

    scheduler
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    Ok(())
}
