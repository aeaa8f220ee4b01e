pub mod download;
pub mod generate;

pub use download::{DownloadQuery, DownloadRequest, StageResponse};
pub use generate::{GenerateRequest, GenerateResponse};

use serde::de::DeserializeOwned;
use service_core::error::AppError;

/// Decode a JSON body regardless of the declared content type.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Error parsing request JSON");
        AppError::BadRequest(anyhow::anyhow!("Invalid JSON in request body"))
    })
}
