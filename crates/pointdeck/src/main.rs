//! The `pointdeck-server` binary.

use pointdeck::{PointdeckError, PointdeckServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), PointdeckError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);

    let server = PointdeckServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .build()
        .await?;

    tracing::info!(port, "pointdeck listening");
    server.run().await
}
