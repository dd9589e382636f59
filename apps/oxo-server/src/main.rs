use oxo::prelude::*;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset. `oxo` also matches the
/// `oxo_*` crates by target prefix.
const DEFAULT_LOG_FILTER: &str = "oxo=info,warn";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        idle_timeout = ?config.room.idle_timeout,
        "starting OXO server"
    );

    let server = OxoServer::builder().config(config).build().await?;
    server.run().await?;
    Ok(())
}
