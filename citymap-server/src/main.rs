mod config;
mod domain;
mod inbound;
mod outbound;

use citymap_core::PreviewRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    // A minimal tracing middleware for request logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let repository = outbound::repositories::InMemorySessionRepository::new(
        config.session_idle_ttl,
        config.max_sessions,
    );
    let map_service = domain::service::Service::new(repository, PreviewRenderer);

    let server_config = inbound::HttpServerConfig {
        port: &config.server_port,
    };
    let http_server = inbound::HttpServer::new(map_service, server_config).await?;

    http_server.run().await
}
