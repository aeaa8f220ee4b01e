//! article-service: generates SEO articles with Gemini and stages them as
//! downloadable HTML files.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
