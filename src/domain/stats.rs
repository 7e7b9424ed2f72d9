//! Statistics ledger domain types.
//!
//! A metric type names an independent time series. Each snapshot records the
//! metric's value and its delta from the preceding snapshot of the same
//! series, so that ordering one series by `recorded_at` yields a chain where
//! every row's `previous_value` is the prior row's `current_value`.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::error::DomainError;

/// Maximum length of a metric type tag (the `stats_logs.metric_type` column).
pub const METRIC_TYPE_MAX_LEN: usize = 50;

/// Validated metric type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MetricType(String);

impl MetricType {
    /// Sum of item quantities across active orders.
    pub const ORDER_COUNT: &'static str = "order_count";
    /// Sum of order totals across active orders.
    pub const SALES: &'static str = "sales";

    /// Validate and wrap a metric tag.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidMetricType`] for an empty or over-long tag.
    pub fn try_new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::InvalidMetricType {
                value,
                reason: "must not be empty",
            });
        }
        if value.chars().count() > METRIC_TYPE_MAX_LEN {
            return Err(DomainError::InvalidMetricType {
                value,
                reason: "must be at most 50 characters",
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn order_count() -> Self {
        Self(Self::ORDER_COUNT.to_string())
    }

    #[must_use]
    pub fn sales() -> Self {
        Self(Self::SALES.to_string())
    }

    /// Metrics maintained by the order trigger.
    #[must_use]
    pub fn known() -> [Self; 2] {
        [Self::order_count(), Self::sales()]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the lock serialising writers of this metric.
    #[must_use]
    pub fn lock_key(&self) -> String {
        format!("stats_{}_lock", self.0)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MetricType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Percentage change between two consecutive snapshot values.
///
/// Zero when `previous` is zero, otherwise rounded half away from zero to two
/// decimal places.
#[must_use]
pub fn change_rate(current: i64, previous: i64) -> Decimal {
    if previous == 0 {
        return to_rate_scale(Decimal::ZERO);
    }
    let delta = Decimal::from(current) - Decimal::from(previous);
    to_rate_scale(delta / Decimal::from(previous) * Decimal::ONE_HUNDRED)
}

/// Round to the `decimal(8,2)` storage scale, padding so `50` prints as `50.00`.
#[must_use]
pub fn to_rate_scale(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// One immutable row of the statistics ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsLogEntry {
    pub id: i64,
    pub metric_type: MetricType,
    pub current_value: i64,
    pub previous_value: i64,
    pub change_rate: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// Snapshot about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshot {
    pub metric_type: MetricType,
    pub current_value: i64,
    pub previous_value: i64,
    pub change_rate: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl NewSnapshot {
    /// Build the next snapshot of a series given its latest row, if any.
    ///
    /// The first snapshot of a series uses its own value as the previous
    /// value, which yields a zero change rate.
    #[must_use]
    pub fn following(
        metric_type: MetricType,
        latest: Option<&StatsLogEntry>,
        current_value: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let previous_value = latest.map_or(current_value, |row| row.current_value);
        Self {
            metric_type,
            current_value,
            previous_value,
            change_rate: change_rate(current_value, previous_value),
            recorded_at,
        }
    }
}

/// Outcome of a stats update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsUpdate {
    pub current_value: i64,
    pub previous_value: i64,
    pub change_rate: Decimal,
    /// True when the value matched the latest snapshot and nothing was written.
    pub skipped: bool,
}

impl StatsUpdate {
    #[must_use]
    pub fn skipped(entry: &StatsLogEntry) -> Self {
        Self {
            current_value: entry.current_value,
            previous_value: entry.previous_value,
            change_rate: entry.change_rate,
            skipped: true,
        }
    }

    #[must_use]
    pub fn written(snapshot: &NewSnapshot) -> Self {
        Self {
            current_value: snapshot.current_value,
            previous_value: snapshot.previous_value,
            change_rate: snapshot.change_rate,
            skipped: false,
        }
    }
}

/// Outcome of a retention cleanup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub before_count: i64,
    pub after_count: i64,
    pub deleted_count: usize,
    pub cutoff: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(current: i64, previous: i64) -> StatsLogEntry {
        StatsLogEntry {
            id: 1,
            metric_type: MetricType::sales(),
            current_value: current,
            previous_value: previous,
            change_rate: change_rate(current, previous),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn change_rate_is_zero_when_previous_is_zero() {
        assert_eq!(change_rate(150, 0), Decimal::ZERO);
        assert_eq!(change_rate(150, 0).to_string(), "0.00");
    }

    #[test]
    fn change_rate_fifty_percent() {
        assert_eq!(change_rate(150, 100), dec!(50.00));
        assert_eq!(change_rate(150, 100).to_string(), "50.00");
    }

    #[test]
    fn change_rate_negative_and_rounded() {
        assert_eq!(change_rate(100, 150), dec!(-33.33));
        assert_eq!(change_rate(2, 3), dec!(-33.33));
        assert_eq!(change_rate(1, 3), dec!(-66.67));
    }

    #[test]
    fn change_rate_rounds_half_away_from_zero() {
        // 1/800 = 0.125%
        assert_eq!(change_rate(801, 800), dec!(0.13));
        assert_eq!(change_rate(799, 800), dec!(-0.13));
    }

    #[test]
    fn first_snapshot_uses_own_value_as_previous() {
        let snap = NewSnapshot::following(MetricType::sales(), None, 1000, Utc::now());
        assert_eq!(snap.previous_value, 1000);
        assert_eq!(snap.change_rate, Decimal::ZERO);
    }

    #[test]
    fn following_snapshot_chains_previous_value() {
        let latest = entry(1000, 1000);
        let snap = NewSnapshot::following(MetricType::sales(), Some(&latest), 1100, Utc::now());
        assert_eq!(snap.previous_value, 1000);
        assert_eq!(snap.change_rate, dec!(10.00));
    }

    #[test]
    fn metric_type_rejects_empty_and_long_tags() {
        assert!(MetricType::try_new("").is_err());
        assert!(MetricType::try_new("   ").is_err());
        assert!(MetricType::try_new("x".repeat(51)).is_err());
        assert!(MetricType::try_new("x".repeat(50)).is_ok());
    }

    #[test]
    fn lock_key_is_scoped_to_metric() {
        assert_eq!(MetricType::order_count().lock_key(), "stats_order_count_lock");
        assert_eq!(MetricType::sales().lock_key(), "stats_sales_lock");
    }

    #[test]
    fn skipped_update_echoes_entry() {
        let latest = entry(1100, 1000);
        let update = StatsUpdate::skipped(&latest);
        assert!(update.skipped);
        assert_eq!(update.current_value, 1100);
        assert_eq!(update.previous_value, 1000);
        assert_eq!(update.change_rate, dec!(10.00));
    }
}
