//! HTTP handlers for the article service.

pub mod download;
pub mod generate;
pub mod health;

pub use download::{serve_download, stage_download};
pub use generate::generate_article;
pub use health::{health_check, metrics, readiness_check};
