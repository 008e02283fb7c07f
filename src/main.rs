use ogserve::{OgserveRuntime, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ogserve::Result<()> {
    // config first so RUST_LOG from a local .env is honored
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    OgserveRuntime::new(config).serve().await
}
