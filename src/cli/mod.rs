//! Command-line interface definitions.

pub mod order;
pub mod output;
pub mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::order::{NewOrderItem, OrderStatus};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Shopledger - order statistics ledger.
#[derive(Parser, Debug)]
#[command(name = "shopledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load the configuration named by `--config`, or defaults.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Config::from_env(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Statistics ledger maintenance and queries
    #[command(subcommand)]
    Stats(StatsCommand),

    /// Order operations that drive the ledger
    #[command(subcommand)]
    Order(OrderCommand),
}

/// Subcommands for `shopledger stats`
#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Delete snapshots older than the retention window
    Cleanup(CleanupArgs),
    /// Recompute active order aggregates and record them
    Update(UpdateArgs),
    /// Show latest snapshots or a metric's history
    Show(ShowArgs),
    /// Run the cleanup on a schedule until interrupted
    Schedule,
}

/// Subcommands for `shopledger order`
#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Change an order's status
    Status(StatusArgs),
    /// Create an order
    Create(CreateArgs),
}

/// Arguments for `stats cleanup`.
#[derive(Parser, Debug)]
pub struct CleanupArgs {
    /// Retention window in days (defaults to stats.retention_days)
    #[arg(long)]
    pub days: Option<u32>,
}

/// Arguments for `stats update`.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Record a value for this metric instead of recomputing aggregates
    #[arg(long, requires = "value")]
    pub metric: Option<String>,

    /// Value to record for --metric
    #[arg(long, requires = "metric", allow_negative_numbers = true)]
    pub value: Option<i64>,
}

/// Arguments for `stats show`.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Show the history of this metric
    #[arg(short, long)]
    pub metric: Option<String>,

    /// Number of history rows
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `order status`.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Order id
    pub id: i64,

    /// New status (pending, processing, confirmed, shipped, delivered, cancelled)
    pub status: OrderStatus,
}

/// Arguments for `order create`.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Customer id
    #[arg(long)]
    pub customer: i64,

    /// Line item as PRODUCT:QTY:PRICE (repeatable)
    #[arg(long = "item", required = true)]
    pub items: Vec<NewOrderItem>,

    /// Initial status
    #[arg(long, default_value = "pending")]
    pub status: OrderStatus,
}

/// Dispatch a parsed command.
pub async fn execute(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Stats(StatsCommand::Cleanup(args)) => stats::cleanup(config, &args),
        Commands::Stats(StatsCommand::Update(args)) => stats::update(config, &args),
        Commands::Stats(StatsCommand::Show(args)) => stats::show(config, &args),
        Commands::Stats(StatsCommand::Schedule) => stats::schedule(config).await,
        Commands::Order(OrderCommand::Status(args)) => order::status(config, &args),
        Commands::Order(OrderCommand::Create(args)) => order::create(config, args),
    }
}
