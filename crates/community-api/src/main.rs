//! Community API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p community-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` when present).

use community_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing still comes up so the failure is logged in the usual format
            if let Err(te) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {}", te);
            }
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {}", e);
    }
    for warning in &config.warnings {
        warning.log();
    }

    info!(
        env = config.app.env.as_str(),
        port = config.api.port,
        "Starting Community API Server..."
    );

    community_api::run(config).await?;

    Ok(())
}
