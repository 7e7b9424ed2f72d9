//! Infrastructure configuration modules.

pub mod locks;
pub mod logging;
pub mod settings;
pub mod stats;

pub use locks::{LockBackend, LocksConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use settings::Config;
pub use stats::StatsConfig;
