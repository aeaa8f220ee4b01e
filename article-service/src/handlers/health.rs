use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "article-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

#[derive(Debug, Deserialize)]
pub struct ReadinessParams {
    /// Also round-trip to the generation API.
    #[serde(default)]
    pub upstream: bool,
}

/// Readiness probe: credential present and staging storage usable.
pub async fn readiness_check(
    State(state): State<AppState>,
    Query(params): Query<ReadinessParams>,
) -> impl IntoResponse {
    if !state.config.google.has_api_key() {
        return unavailable("API key is not configured".to_string());
    }

    if let Err(e) = state.stager.health_check().await {
        tracing::warn!(error = %e, "Staging storage not ready");
        return unavailable(e.to_string());
    }

    if params.upstream {
        if let Err(e) = state.text_provider.health_check().await {
            tracing::warn!(error = %e, "Generation provider not ready");
            return unavailable(e.to_string());
        }
    }

    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

fn unavailable(reason: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unavailable", "error": reason })),
    )
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::services::metrics::get_metrics(),
    )
}
