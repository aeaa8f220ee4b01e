//! service-core: Shared infrastructure for the article services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
