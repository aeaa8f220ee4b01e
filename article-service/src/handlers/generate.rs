use crate::dtos::{parse_json_body, GenerateRequest, GenerateResponse};
use crate::services::generator::{GenerationError, GenerationStage};
use crate::services::metrics;
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;
use service_core::middleware::RequestId;
use validator::Validate;

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::UpstreamError(anyhow::Error::new(err))
    }
}

/// POST /generate
#[tracing::instrument(skip_all, fields(request_id))]
pub async fn generate_article(
    State(state): State<AppState>,
    request_id: Option<axum::Extension<RequestId>>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, AppError> {
    if let Some(axum::Extension(id)) = &request_id {
        tracing::Span::current().record("request_id", tracing::field::display(id));
    }

    let request: GenerateRequest = parse_json_body(&body)?;
    request.validate().inspect_err(|_| {
        metrics::record_article_generated("invalid_input");
    })?;
    let request = request.into_article_request();

    tracing::info!(
        title = %request.title,
        location = %request.location,
        custom_keywords = request.custom_keywords.is_some(),
        "Generating article"
    );

    if !state.config.google.has_api_key() {
        tracing::error!("Gemini API key is not configured");
        metrics::record_article_generated("not_configured");
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "API key is not configured. Please check your environment variables."
        )));
    }

    let generated = state.generator.generate(&request).await.map_err(|e| {
        tracing::error!(stage = %e.stage, error = %e, "Article generation failed");
        metrics::record_article_generated(match e.stage {
            GenerationStage::Keywords => "keywords_failed",
            GenerationStage::Article => "article_failed",
        });
        AppError::from(e)
    })?;

    tracing::info!(
        keywords_len = generated.keywords.as_str().len(),
        article_len = generated.article.len(),
        "Article generation complete"
    );
    metrics::record_article_generated("success");

    Ok(Json(GenerateResponse::from(generated)))
}
