//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: named locks, the
//! aggregate cache, and event notification.

pub mod cache;
pub mod lock;
pub mod notifier;
