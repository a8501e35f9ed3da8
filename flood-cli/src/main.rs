//! Flood Watch CLI entry point

use clap::Parser;
use flood_api::{init_logging, LogConfig};
use flood_cli::{handler, Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if matches!(cli.command, Commands::Serve { .. }) {
        if let Err(e) = init_logging(&LogConfig::from_env()) {
            eprintln!("Failed to initialize logging: {}", e);
        }
    } else if cli.verbose {
        init_verbose_logging();
    }

    if let Err(e) = handler::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_verbose_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flood_cli=debug,flood_db=debug,flood_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
