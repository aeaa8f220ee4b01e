//! Prometheus metrics for article-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so library
//! code and tests can call them unconditionally.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

static INIT: Once = Once::new();

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// HTTP metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// AI-specific metrics
pub static GENAI_TOKENS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static GENAI_PROVIDER_ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static ARTICLES_GENERATED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Staging metrics
pub static STAGED_FILES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static STAGED_FILE_RETRIEVALS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(register_metrics);
}

fn register_metrics() {
    let registry = Registry::new();

    let http_requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("Failed to create http_requests_total metric");

    let http_request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]),
        &["method", "path"],
    )
    .expect("Failed to create http_request_duration_seconds metric");

    // Token counter (input/output by pipeline stage and model)
    let genai_tokens = IntCounterVec::new(
        Opts::new("genai_tokens_total", "Total tokens processed"),
        &["stage", "model", "type"], // type: input, output
    )
    .expect("Failed to create genai_tokens_total metric");

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "AI provider API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["stage", "model"],
    )
    .expect("Failed to create genai_provider_latency_seconds metric");

    let provider_errors = IntCounterVec::new(
        Opts::new("genai_provider_errors_total", "Total AI provider errors"),
        &["stage", "error_type"],
    )
    .expect("Failed to create genai_provider_errors_total metric");

    let articles_generated = IntCounterVec::new(
        Opts::new("articles_generated_total", "Article generation requests by outcome"),
        &["outcome"],
    )
    .expect("Failed to create articles_generated_total metric");

    let staged_files = IntCounterVec::new(
        Opts::new("staged_files_total", "Article files written to staging"),
        &["outcome"],
    )
    .expect("Failed to create staged_files_total metric");

    let staged_retrievals = IntCounterVec::new(
        Opts::new(
            "staged_file_retrievals_total",
            "Staged article download attempts",
        ),
        &["outcome"],
    )
    .expect("Failed to create staged_file_retrievals_total metric");

    // Register all metrics
    registry
        .register(Box::new(http_requests_total.clone()))
        .expect("Failed to register http_requests_total");
    registry
        .register(Box::new(http_request_duration.clone()))
        .expect("Failed to register http_request_duration_seconds");
    registry
        .register(Box::new(genai_tokens.clone()))
        .expect("Failed to register genai_tokens_total");
    registry
        .register(Box::new(provider_latency.clone()))
        .expect("Failed to register genai_provider_latency_seconds");
    registry
        .register(Box::new(provider_errors.clone()))
        .expect("Failed to register genai_provider_errors_total");
    registry
        .register(Box::new(articles_generated.clone()))
        .expect("Failed to register articles_generated_total");
    registry
        .register(Box::new(staged_files.clone()))
        .expect("Failed to register staged_files_total");
    registry
        .register(Box::new(staged_retrievals.clone()))
        .expect("Failed to register staged_file_retrievals_total");

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(http_requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(http_request_duration);
    let _ = GENAI_TOKENS_TOTAL.set(genai_tokens);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = GENAI_PROVIDER_ERRORS_TOTAL.set(provider_errors);
    let _ = ARTICLES_GENERATED_TOTAL.set(articles_generated);
    let _ = STAGED_FILES_TOTAL.set(staged_files);
    let _ = STAGED_FILE_RETRIEVALS_TOTAL.set(staged_retrievals);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record a completed HTTP request.
pub fn record_http_request(method: &str, path: &str, status: &str, duration_secs: f64) {
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, path, status]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

/// Record token usage for one upstream call.
pub fn record_tokens(stage: &str, model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(counter) = GENAI_TOKENS_TOTAL.get() {
        counter
            .with_label_values(&[stage, model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        counter
            .with_label_values(&[stage, model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

/// Record provider latency.
pub fn record_provider_latency(stage: &str, model: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[stage, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(stage: &str, error_type: &str) {
    if let Some(counter) = GENAI_PROVIDER_ERRORS_TOTAL.get() {
        counter.with_label_values(&[stage, error_type]).inc();
    }
}

/// Record the outcome of a /generate request (`success`, `keywords_failed`, ...).
pub fn record_article_generated(outcome: &str) {
    if let Some(counter) = ARTICLES_GENERATED_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_staged_file(outcome: &str) {
    if let Some(counter) = STAGED_FILES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_staged_file_retrieval(outcome: &str) {
    if let Some(counter) = STAGED_FILE_RETRIEVALS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_text_includes_recorded_series() {
        init_metrics();
        record_article_generated("success");
        record_staged_file("success");

        let text = get_metrics();
        assert!(text.contains("articles_generated_total"));
        assert!(text.contains("staged_files_total"));
    }
}
