use std::sync::Arc;

use anyhow::Result;
use flock_app::server;
use flock_common::observability::{init_logging, LogConfig};
use flock_config::{FlockConfig, FlockConfigLoader};
use flock_http::HttpClient;
use flock_scraper::Scraper;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first; a missing or malformed credentials file must abort
    // before anything binds.
    let cfg: FlockConfig = FlockConfigLoader::new().with_file("flock.yaml").load()?;

    init_logging(LogConfig::default())?;

    let http = HttpClient::new(&cfg.server.upstream)?;
    let scraper = Scraper::login(http, &cfg.credentials.username, &cfg.credentials.password).await?;

    let app = server::router(Arc::new(scraper));

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr).await?;
    tracing::info!("serving follower counts on {}", cfg.server.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
