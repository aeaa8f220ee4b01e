//! Test helpers for article-service integration tests.
//!
//! Builds the real router around a scripted mock provider and a per-test
//! temporary staging directory.

#![allow(dead_code)]

use article_service::config::{
    ArticleConfig, GoogleConfig, ModelConfig, StorageConfig, DEFAULT_GEMINI_API_BASE,
};
use article_service::services::providers::mock::MockTextProvider;
use article_service::services::LocalStorage;
use article_service::{build_router, AppState};
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockTextProvider>,
    pub storage_dir: PathBuf,
    _tmp: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not UTF-8")
    }
}

pub fn test_config(storage_dir: &Path, api_key: Option<&str>) -> ArticleConfig {
    ArticleConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "debug".to_string(),
        },
        models: ModelConfig {
            text_model: "gemini-1.5-flash".to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            request_timeout_secs: 5,
        },
        google: GoogleConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
        },
        storage: StorageConfig {
            base_path: storage_dir.to_path_buf(),
        },
        otlp_endpoint: None,
    }
}

/// App with a configured credential and the given scripted provider.
pub fn spawn_app(provider: MockTextProvider) -> TestApp {
    spawn_app_with_key(provider, Some("test-api-key"))
}

pub fn spawn_app_with_key(provider: MockTextProvider, api_key: Option<&str>) -> TestApp {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let storage_dir = tmp.path().join("downloads");
    let provider = Arc::new(provider);

    let state = AppState::new(
        test_config(&storage_dir, api_key),
        provider.clone(),
        Arc::new(LocalStorage::new(&storage_dir)),
    );

    TestApp {
        router: build_router(state),
        provider,
        storage_dir,
        _tmp: tmp,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.post_raw(uri, body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, body: impl Into<String>) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.into()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Number of files currently in the staging directory.
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(&self.storage_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
