mod api;
mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net;
use tower_http::trace::TraceLayer;
use tracing::{Level, event, info_span};

use crate::domain::ports::MapService;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

#[derive(Debug, Clone)]
/// The global application state shared between all request handlers.
struct AppState<MS: MapService> {
    map_service: Arc<MS>,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(
        map_service: impl MapService,
        config: HttpServerConfig<'_>,
    ) -> anyhow::Result<Self> {
        let trace_layer = TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                info_span!("http_request", method = ?request.method(), uri)
            },
        );

        let router = router(map_service).layer(trace_layer);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        event!(
            Level::INFO,
            "listening on {}",
            self.listener.local_addr()?
        );
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

fn router<MS: MapService>(map_service: MS) -> Router {
    let state = AppState {
        map_service: Arc::new(map_service),
    };

    Router::new()
        .route("/maps", post(handlers::generate_map_handler::<MS>))
        .route(
            "/maps/{session_id}/download",
            get(handlers::download_map_handler::<MS>),
        )
        .route(
            "/maps/{session_id}/preview",
            get(handlers::preview_map_handler::<MS>),
        )
        .route("/styles/{scheme}", get(handlers::styles_handler))
        .route("/layers", get(handlers::layers_handler))
        .with_state(state)
}
