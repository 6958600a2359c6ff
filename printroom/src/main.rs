use anyhow::Result;
use clap::Parser;
use printroom::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // PRINTROOM_API_TOKEN may come from a .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "printroom starting");

    let cli = Cli::parse();
    let result = run(cli).await;
    match &result {
        Ok(()) => tracing::info!("printroom finished"),
        Err(e) => tracing::error!(error = %e, "printroom failed"),
    }
    result
}
