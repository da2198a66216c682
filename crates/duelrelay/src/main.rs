//! Standalone relay binary.
//!
//! Configuration comes from the environment (see [`ServerConfig::from_env`]);
//! log verbosity from `RUST_LOG` (default `info`).

use duelrelay::{DuelrelayServerBuilder, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let server = DuelrelayServerBuilder::new().config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "duelrelay listening");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
