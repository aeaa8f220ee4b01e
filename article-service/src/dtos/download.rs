use crate::models::StagedFile;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DownloadRequest {
    pub title: Option<String>,
    #[validate(
        required(message = "Article content is required"),
        length(min = 1, message = "Article content is required")
    )]
    pub article: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResponse {
    pub success: bool,
    pub filename: String,
    pub file_path: String,
}

impl From<StagedFile> for StageResponse {
    fn from(staged: StagedFile) -> Self {
        Self {
            success: true,
            filename: staged.filename,
            file_path: staged.file_path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub filename: Option<String>,
}
