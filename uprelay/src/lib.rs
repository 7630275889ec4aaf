//! Upload relay service.
//!
//! A small HTTP service that accepts base64-encoded file uploads from brand
//! frontends and relays them into a fixed repository in a remote object store
//! (the GitHub contents API), returning the public URL where the file is
//! served. Existing objects are overwritten via a freshly-fetched version
//! marker; missing objects are created.

pub mod api;
pub mod config;
pub mod errors;
pub mod openapi;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;

pub use config::Config;

use crate::api::handlers::uploads::{method_not_allowed, preflight, upload};
use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use crate::store::GitHubStore;

/// Shared state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<GitHubStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(GitHubStore::from_config(&config.store));
        Self { config, store }
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allow_origin = if config.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let origins = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|o| match o {
                CorsOrigin::Url(url) => Some(url.as_str().trim_end_matches('/').to_owned()),
                CorsOrigin::Wildcard => None,
            })
            .map(|origin| {
                HeaderValue::from_str(&origin).with_context(|| format!("Invalid CORS origin: {origin}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router.
///
/// The upload route handles its own plain-OPTIONS and unsupported-method
/// responses; real CORS preflights never reach it because the CORS layer
/// answers them first.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/upload", post(upload).options(preflight).fallback(method_not_allowed))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The application, constructed from configuration and served until shutdown.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        if !config.store_configured() {
            tracing::warn!("GITHUB_TOKEN / GITHUB_USERNAME not set; upload requests will fail until configured");
        }

        let state = AppState::new(config.clone());
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Serve until the provided shutdown future resolves.
    pub async fn serve(self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let address = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind to {address}"))?;

        tracing::info!("Listening on {address}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        Ok(())
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, test_config};

    #[tokio::test]
    async fn test_healthz() {
        let server = create_test_app(test_config("http://localhost:9"));
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let server = create_test_app(test_config("http://localhost:9"));
        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();

        let document: serde_json::Value = response.json();
        assert!(document["paths"]["/upload"]["post"].is_object());
    }
}
