use crate::dtos::{parse_json_body, DownloadQuery, DownloadRequest, StageResponse};
use crate::services::metrics;
use crate::services::staging::StagingError;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::EmptyArticle | StagingError::InvalidFilename => {
                AppError::BadRequest(anyhow::Error::new(err))
            }
            StagingError::NotFound => AppError::NotFound(anyhow::Error::new(err)),
            StagingError::Storage(e) => AppError::InternalError(anyhow::Error::new(e)),
            StagingError::Render(e) => AppError::InternalError(anyhow::Error::new(e)),
        }
    }
}

/// POST /download: write the article as a standalone HTML file.
#[tracing::instrument(skip_all)]
pub async fn stage_download(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StageResponse>, AppError> {
    let request: DownloadRequest = parse_json_body(&body)?;
    request.validate()?;

    let article = request.article.unwrap_or_default();
    let staged = state
        .stager
        .stage(request.title.as_deref(), &article)
        .await
        .inspect_err(|_| metrics::record_staged_file("failed"))?;

    metrics::record_staged_file("success");
    Ok(Json(StageResponse::from(staged)))
}

/// GET /download?filename=...: serve a staged file as an attachment.
#[tracing::instrument(skip_all)]
pub async fn serve_download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filename = query
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Filename is required")))?;

    let content = state.stager.retrieve(&filename).await.inspect_err(|e| {
        metrics::record_staged_file_retrieval(match e {
            StagingError::NotFound => "not_found",
            StagingError::InvalidFilename => "invalid",
            _ => "failed",
        })
    })?;

    tracing::info!(filename = %filename, size = content.len(), "Serving staged file");
    metrics::record_staged_file_retrieval("success");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        content,
    ))
}
