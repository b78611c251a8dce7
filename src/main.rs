#![allow(clippy::result_large_err)]

use article_desk::{
    backend::HttpBackend,
    cli::{self, Cli},
    config,
    errors::Result,
};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible). Logs go to stderr so command
    //    output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally

    // 3. Parse the command line before touching config, so --help works anywhere
    let cli = Cli::parse();

    // 4. Load the application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(backend = %app_config.backend.base_url, "Configuration loaded.");

    // 5. Build the backend client
    let backend = HttpBackend::new(&app_config.backend)
        .inspect_err(|e| error!("Failed to build backend client: {}", e))?;

    // 6. Run the command
    cli::run(cli, &app_config, &backend)
        .await
        .inspect_err(|e| error!("{}", e))
}
