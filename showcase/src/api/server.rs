//! API server for the showcase

use anyhow::Result;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::middleware::forward_token;
use super::routes::{clear_cache, health_check, layout, projects, AppState};

/// Configuration for the API server
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Build the router over `state`
pub fn router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    let api = Router::new()
        .route("/api/projects", get(projects))
        .route("/api/layout", get(layout))
        .route("/api/cache/clear", post(clear_cache))
        .route_layer(from_fn(forward_token));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        let app = router(self.state);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
