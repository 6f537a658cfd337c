//! Backend entry-point: configuration, tracing, and the HTTP server.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use redress_backend::server::{self, AppConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    server::run(config).await
}
