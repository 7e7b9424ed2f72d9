//! Notification adapters.
//!
//! Implements the [`StatsNotifier`](crate::port::outbound::notifier::StatsNotifier)
//! port for logging and in-process broadcast subscribers.

pub mod broadcast;
pub mod log;

pub use broadcast::BroadcastNotifier;
pub use log::LogNotifier;
