use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

/// Model used for both keyword and article generation.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";

/// Public Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Upper bound for one upstream round-trip.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Directory name created under the system temp dir for staged downloads.
const DEFAULT_STORAGE_DIR_NAME: &str = "articleoux-downloads";

/// Credential lookup order; the first non-empty value wins.
const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone)]
pub struct ArticleConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub storage: StorageConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model for keyword and article text (e.g., gemini-1.5-flash)
    pub text_model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Absent when neither credential variable is set. Requests then fail with
    /// a configuration error instead of the process refusing to start.
    pub api_key: Option<Secret<String>>,
}

impl GoogleConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base directory staged HTML files are written to.
    pub base_path: PathBuf,
}

impl ArticleConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        Ok(ArticleConfig {
            common: common_config,
            models: ModelConfig {
                text_model: normalize_model_name(&get_env(
                    "GENAI_TEXT_MODEL",
                    DEFAULT_TEXT_MODEL,
                )),
                api_base: get_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                request_timeout_secs: parse_timeout_secs(
                    env::var("GENAI_REQUEST_TIMEOUT_SECS").ok().as_deref(),
                )?,
            },
            google: GoogleConfig {
                api_key: first_non_empty(&API_KEY_VARS).map(Secret::new),
            },
            storage: StorageConfig {
                base_path: env::var("ARTICLE_STORAGE_DIR")
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(default_storage_dir),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

/// `<system temp>/articleoux-downloads`
pub fn default_storage_dir() -> PathBuf {
    env::temp_dir().join(DEFAULT_STORAGE_DIR_NAME)
}

/// Accepts both `gemini-1.5-flash` and the SDK style `models/gemini-1.5-flash`.
fn normalize_model_name(model: &str) -> String {
    model.strip_prefix("models/").unwrap_or(model).to_string()
}

/// Unset or empty means the default; anything else must be a positive integer.
fn parse_timeout_secs(raw: Option<&str>) -> Result<u64, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
        Some(value) => value
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "GENAI_REQUEST_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                    value
                ))
            }),
    }
}

fn first_non_empty(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.is_empty())
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_prefix_is_stripped() {
        assert_eq!(
            normalize_model_name("models/gemini-1.5-flash"),
            "gemini-1.5-flash"
        );
        assert_eq!(normalize_model_name("gemini-2.0-flash"), "gemini-2.0-flash");
    }

    #[test]
    fn default_storage_dir_lives_in_temp() {
        let dir = default_storage_dir();
        assert!(dir.starts_with(env::temp_dir()));
        assert!(dir.ends_with(DEFAULT_STORAGE_DIR_NAME));
    }

    #[test]
    fn timeout_defaults_when_unset() {
        assert_eq!(parse_timeout_secs(None).unwrap(), DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some("")).unwrap(), DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some("30")).unwrap(), 30);
    }

    #[test]
    fn unparsable_timeout_is_a_config_error() {
        for raw in ["abc", "-5", "0", "1.5"] {
            let err = parse_timeout_secs(Some(raw)).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)), "{raw}");
            assert!(err.to_string().contains("GENAI_REQUEST_TIMEOUT_SECS"));
        }
    }

    #[test]
    fn empty_api_key_is_not_configured() {
        let google = GoogleConfig {
            api_key: Some(Secret::new(String::new())),
        };
        assert!(!google.has_api_key());

        let google = GoogleConfig {
            api_key: Some(Secret::new("key".to_string())),
        };
        assert!(google.has_api_key());
    }
}
