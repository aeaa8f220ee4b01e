//! Domain models for the article service.

pub mod article;
pub mod staged_file;

pub use article::{ArticleRequest, GeneratedArticle, Keywords, Location};
pub use staged_file::StagedFile;
