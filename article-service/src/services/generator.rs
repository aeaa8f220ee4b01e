//! Two-step article pipeline: keywords, then the article body.
//!
//! The second step consumes the typed output of the first, so a failure in
//! the keyword step means the article step is never attempted.

use crate::models::{ArticleRequest, GeneratedArticle, Keywords, Location};
use crate::services::metrics;
use crate::services::prompts::{article_prompt, keywords_prompt};
use crate::services::providers::{GenerationParams, ProviderError, SafetySetting, TextProvider};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

const TEMPERATURE: f32 = 0.7;
const TOP_P: f32 = 0.95;
const TOP_K: i32 = 40;
const KEYWORDS_MAX_TOKENS: i32 = 512;
const ARTICLE_MAX_TOKENS: i32 = 2048;

/// Pipeline step an upstream failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Keywords,
    Article,
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::Keywords => "keywords",
            GenerationStage::Article => "article",
        }
    }

    fn max_tokens(&self) -> i32 {
        match self {
            GenerationStage::Keywords => KEYWORDS_MAX_TOKENS,
            GenerationStage::Article => ARTICLE_MAX_TOKENS,
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Failed to generate {stage}: {source}")]
pub struct GenerationError {
    pub stage: GenerationStage,
    #[source]
    pub source: ProviderError,
}

/// Sampling configuration shared by both steps; only the output cap differs.
pub fn generation_params(stage: GenerationStage) -> GenerationParams {
    GenerationParams {
        temperature: Some(TEMPERATURE),
        top_p: Some(TOP_P),
        top_k: Some(TOP_K),
        max_tokens: Some(stage.max_tokens()),
        safety_settings: SafetySetting::block_medium_and_above(),
    }
}

#[derive(Clone)]
pub struct ArticleGenerator {
    provider: Arc<dyn TextProvider>,
}

impl ArticleGenerator {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate_keywords(
        &self,
        title: &str,
        location: &Location,
    ) -> Result<Keywords, GenerationError> {
        tracing::info!(location = %location, "Generating keywords");

        let text = self
            .call(GenerationStage::Keywords, &keywords_prompt(title, location))
            .await?;

        tracing::info!(
            preview = %text.chars().take(100).collect::<String>(),
            "Keywords generated"
        );
        Ok(Keywords::new(text))
    }

    /// Returns the upstream HTML as-is (trimmed); nothing is validated or escaped.
    pub async fn generate_article(
        &self,
        title: &str,
        keywords: &Keywords,
        location: &Location,
    ) -> Result<String, GenerationError> {
        tracing::info!(location = %location, "Generating article");

        let article = self
            .call(
                GenerationStage::Article,
                &article_prompt(title, keywords, location),
            )
            .await?;

        tracing::info!(article_len = article.len(), "Article generated");
        Ok(article)
    }

    pub async fn generate(&self, request: &ArticleRequest) -> Result<GeneratedArticle, GenerationError> {
        let keywords = match &request.custom_keywords {
            Some(custom) => {
                tracing::info!(keywords = %custom, "Using custom keywords");
                Keywords::new(custom.clone())
            }
            None => {
                self.generate_keywords(&request.title, &request.location)
                    .await?
            }
        };

        let article = self
            .generate_article(&request.title, &keywords, &request.location)
            .await?;

        Ok(GeneratedArticle {
            title: request.title.clone(),
            keywords,
            article,
        })
    }

    async fn call(&self, stage: GenerationStage, prompt: &str) -> Result<String, GenerationError> {
        let model = self.provider.model().to_string();
        let start = Instant::now();
        let result = self
            .provider
            .generate(prompt, &generation_params(stage))
            .await;
        metrics::record_provider_latency(stage.as_str(), &model, start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                metrics::record_tokens(
                    stage.as_str(),
                    &model,
                    response.input_tokens,
                    response.output_tokens,
                );
                Ok(response.text.trim().to_string())
            }
            Err(source) => {
                metrics::record_provider_error(stage.as_str(), source.kind());
                tracing::error!(
                    stage = %stage,
                    model = %model,
                    error = %source,
                    "Upstream generation failed"
                );
                Err(GenerationError { stage, source })
            }
        }
    }
}
