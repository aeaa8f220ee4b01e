//! AI provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for text providers,
//! allowing the Gemini backend to be swapped for a scripted mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Empty response from provider")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered(_) => "content_filtered",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

impl FinishReason {
    pub fn from_api(reason: Option<&str>) -> Self {
        match reason {
            None | Some("STOP") => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    /// Block medium-and-above across harassment, hate speech, sexual and
    /// dangerous content.
    pub fn block_medium_and_above() -> Vec<SafetySetting> {
        [
            HarmCategory::HarmCategoryHarassment,
            HarmCategory::HarmCategoryHateSpeech,
            HarmCategory::HarmCategorySexuallyExplicit,
            HarmCategory::HarmCategoryDangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: HarmBlockThreshold::BlockMediumAndAbove,
        })
        .collect()
    }
}

/// Generation parameters for AI requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Top-p sampling.
    pub top_p: Option<f32>,

    /// Top-k sampling.
    pub top_k: Option<i32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,

    pub safety_settings: Vec<SafetySetting>,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate text response.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Name of the backing model, for logs and metrics.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_settings_serialize_to_api_names() {
        let json = serde_json::to_value(SafetySetting::block_medium_and_above()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[0]["category"], "HARM_CATEGORY_HARASSMENT");
        assert_eq!(json[1]["category"], "HARM_CATEGORY_HATE_SPEECH");
        assert_eq!(json[2]["category"], "HARM_CATEGORY_SEXUALLY_EXPLICIT");
        assert_eq!(json[3]["category"], "HARM_CATEGORY_DANGEROUS_CONTENT");
        assert!(json
            .as_array()
            .unwrap()
            .iter()
            .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
    }

    #[test]
    fn finish_reasons_map_from_api() {
        assert_eq!(FinishReason::from_api(Some("STOP")), FinishReason::Complete);
        assert_eq!(FinishReason::from_api(None), FinishReason::Complete);
        assert_eq!(
            FinishReason::from_api(Some("MAX_TOKENS")),
            FinishReason::Length
        );
        assert_eq!(
            FinishReason::from_api(Some("SAFETY")),
            FinishReason::ContentFilter
        );
        assert_eq!(FinishReason::from_api(Some("RECITATION")), FinishReason::Other);
    }
}
