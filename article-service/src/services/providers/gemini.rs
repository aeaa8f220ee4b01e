//! Gemini AI provider implementation.
//!
//! Implements text generation using Google's Gemini `generateContent` REST API.

use super::{
    FinishReason, GenerationParams, ProviderError, ProviderResponse, SafetySetting, TextProvider,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("Gemini API key not configured".to_string()))
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method,
            api_key
        )
    }

    /// Build generation config from parameters.
    fn build_generation_config(&self, params: &GenerationParams) -> GenerationConfig {
        GenerationConfig {
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            max_output_tokens: params.max_tokens,
        }
    }

    fn build_request(&self, prompt: &str, params: &GenerationParams) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: Some(self.build_generation_config(params)),
            safety_settings: if params.safety_settings.is_empty() {
                None
            } else {
                Some(params.safety_settings.clone())
            },
        }
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if prompt.trim().is_empty() {
            return Err(ProviderError::InvalidRequest("Prompt is empty".to_string()));
        }

        let api_key = self.api_key()?;
        let request = self.build_request(prompt, params);
        let url = self.api_url("generateContent", api_key);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            max_tokens = ?params.max_tokens,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        parse_response(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let api_key = self.api_key()?;

        // Fetching the model metadata verifies both the key and the model name
        let url = format!(
            "{}/models/{}?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn parse_response(api_response: GenerateContentResponse) -> Result<ProviderResponse, ProviderError> {
    if let Some(reason) = api_response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(ProviderError::ContentFiltered(format!(
            "prompt blocked: {}",
            reason
        )));
    }

    let candidate = api_response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    let finish_reason = FinishReason::from_api(candidate.finish_reason.as_deref());
    if finish_reason == FinishReason::ContentFilter {
        return Err(ProviderError::ContentFiltered(
            candidate
                .finish_reason
                .unwrap_or_else(|| "SAFETY".to_string()),
        ));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    let usage = api_response.usage_metadata.unwrap_or_default();

    Ok(ProviderResponse {
        text,
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
        finish_reason,
    })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}
