use anyhow::Result;
use clap::Parser;
use r2sync::cli::{print_report, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(report) => {
            print_report(&report);
            if !report.is_clean() {
                tracing::error!(failed = report.failed.len(), "CLI exited with failed items");
                std::process::exit(1);
            }
            tracing::info!("CLI completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            Err(e)
        }
    }
}
