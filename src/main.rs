use clap::Parser;
use shopledger::cli::{self, output, Cli};
use shopledger::infrastructure::config::LoggingConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(c) => c,
        Err(e) => {
            LoggingConfig::default().init();
            error!(error = %e, "Failed to load config");
            output::error(&format!("Failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!(database = %config.database, "shopledger starting");

    if let Err(e) = cli::execute(cli.command, &config).await {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
