use crate::models::article::non_empty;
use crate::models::{ArticleRequest, GeneratedArticle, Location};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub custom_keywords: Option<String>,
}

impl GenerateRequest {
    /// Call after `validate()`; a missing title becomes empty.
    pub fn into_article_request(self) -> ArticleRequest {
        ArticleRequest {
            title: self.title.unwrap_or_default(),
            location: Location::new(self.city, self.country),
            custom_keywords: non_empty(self.custom_keywords),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub title: String,
    pub keywords: String,
    pub article: String,
}

impl From<GeneratedArticle> for GenerateResponse {
    fn from(generated: GeneratedArticle) -> Self {
        Self {
            title: generated.title,
            keywords: generated.keywords.into_inner(),
            article: generated.article,
        }
    }
}
