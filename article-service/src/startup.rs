//! Application startup and lifecycle management.

use crate::config::ArticleConfig;
use crate::handlers::{
    generate_article, health_check, metrics, readiness_check, serve_download, stage_download,
};
use crate::middleware::metrics_middleware;
use crate::services::generator::ArticleGenerator;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::staging::DownloadStager;
use crate::services::storage::{LocalStorage, Storage};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ArticleConfig,
    pub text_provider: Arc<dyn TextProvider>,
    pub generator: ArticleGenerator,
    pub stager: DownloadStager,
}

impl AppState {
    /// Wire the pipeline and stager around the given backends.
    pub fn new(
        config: ArticleConfig,
        text_provider: Arc<dyn TextProvider>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            config,
            generator: ArticleGenerator::new(text_provider.clone()),
            text_provider,
            stager: DownloadStager::new(storage),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate_article))
        .route("/download", post(stage_download).get(serve_download))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route_layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(security_headers_middleware))
        // Outermost, so the trace span and handlers both see the id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ArticleConfig) -> Result<Self, AppError> {
        let gemini_config = GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.models.text_model.clone(),
            api_base: config.models.api_base.clone(),
            timeout: Duration::from_secs(config.models.request_timeout_secs),
        };
        let text_provider: Arc<dyn TextProvider> = Arc::new(
            GeminiTextProvider::new(gemini_config)
                .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
        );

        tracing::info!(
            model = %config.models.text_model,
            api_key_configured = config.google.has_api_key(),
            "Initialized Gemini text provider"
        );
        if !config.google.has_api_key() {
            tracing::warn!("Neither GOOGLE_API_KEY nor GEMINI_API_KEY is set; /generate will fail");
        }

        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(&config.storage.base_path));
        tracing::info!(
            base_path = %config.storage.base_path.display(),
            "Initialized staging storage"
        );

        let state = AppState::new(config.clone(), text_provider, storage);
        Self::with_state(state).await
    }

    /// Bind a listener for an already wired state (port 0 = random port for testing).
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        let address = format!("{}:{}", state.config.common.host, state.config.common.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Article service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
