//! Download staging: wrap a generated article in a standalone HTML document,
//! store it under a derived filename, and hand it back later by that name.

use crate::models::StagedFile;
use crate::models::article::non_empty;
use crate::services::storage::{Storage, StorageError};
use askama::Template;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_FILENAME_STEM: &str = "article";
const DEFAULT_DOCUMENT_TITLE: &str = "Generated Article";
const FILE_EXTENSION: &str = ".html";
const MAX_FILENAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Article content is required")]
    EmptyArticle,

    #[error("Invalid filename")]
    InvalidFilename,

    #[error("File not found")]
    NotFound,

    #[error("Failed to render document: {0}")]
    Render(#[from] askama::Error),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for StagingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => StagingError::NotFound,
            StorageError::InvalidKey(_) => StagingError::InvalidFilename,
            other => StagingError::Storage(other),
        }
    }
}

/// Every char outside `[A-Za-z0-9]` becomes `_`, one per UTF-16 code unit, so
/// astral chars such as emoji yield `__`. Everything is lower-cased and empty
/// input yields `article`.
pub fn sanitize(title: &str) -> String {
    if title.is_empty() {
        return DEFAULT_FILENAME_STEM.to_string();
    }
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.extend(std::iter::repeat('_').take(c.len_utf16()));
        }
    }
    out
}

/// `sanitize(title)_<millis>.html`
pub fn staged_filename(title: Option<&str>, timestamp_millis: i64) -> String {
    format!(
        "{}_{}{}",
        sanitize(title.unwrap_or_default()),
        timestamp_millis,
        FILE_EXTENSION
    )
}

/// Allow-list for names accepted on retrieval: `[A-Za-z0-9_-]+\.html`.
pub fn is_valid_filename(filename: &str) -> bool {
    if filename.len() > MAX_FILENAME_LEN {
        return false;
    }
    match filename.strip_suffix(FILE_EXTENSION) {
        Some(stem) => {
            !stem.is_empty()
                && stem
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

/// Standalone document around the article. `title` is escaped, the body is
/// inserted verbatim.
#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleDocument<'a> {
    pub title: &'a str,
    pub article: &'a str,
}

pub fn render_document(title: Option<&str>, article: &str) -> Result<String, StagingError> {
    let document = ArticleDocument {
        title: title.unwrap_or(DEFAULT_DOCUMENT_TITLE),
        article,
    };
    Ok(document.render()?)
}

#[derive(Clone)]
pub struct DownloadStager {
    storage: Arc<dyn Storage>,
}

impl DownloadStager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn stage(&self, title: Option<&str>, article: &str) -> Result<StagedFile, StagingError> {
        self.stage_at(title, article, Utc::now().timestamp_millis())
            .await
    }

    /// Same-title calls within one millisecond share a filename; the later write wins.
    pub async fn stage_at(
        &self,
        title: Option<&str>,
        article: &str,
        timestamp_millis: i64,
    ) -> Result<StagedFile, StagingError> {
        if article.is_empty() {
            return Err(StagingError::EmptyArticle);
        }

        let title = non_empty(title.map(str::to_string));
        let filename = staged_filename(title.as_deref(), timestamp_millis);
        let document = render_document(title.as_deref(), article)?;

        let file_path = self
            .storage
            .put(&filename, document.into_bytes())
            .await
            .map_err(|e| {
                tracing::error!(filename = %filename, error = %e, "Failed to write staged file");
                StagingError::from(e)
            })?;

        tracing::info!(filename = %filename, file_path = %file_path, "File saved");
        Ok(StagedFile {
            filename,
            file_path,
        })
    }

    pub async fn retrieve(&self, filename: &str) -> Result<Vec<u8>, StagingError> {
        if !is_valid_filename(filename) {
            tracing::warn!(filename = %filename, "Rejected download filename");
            return Err(StagingError::InvalidFilename);
        }

        self.storage.get(filename).await.map_err(|e| {
            match &e {
                StorageError::NotFound(_) => {
                    tracing::warn!(filename = %filename, "File not found")
                }
                _ => tracing::error!(filename = %filename, error = %e, "Failed to read staged file"),
            }
            StagingError::from(e)
        })
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.storage.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::{LocalStorage, MemoryStorage};

    #[test]
    fn sanitize_keeps_only_lowercase_alphanumerics_and_underscores() {
        for title in [
            "Hello, World!",
            "../../etc/passwd",
            "C:\\Windows\\system32",
            "Ünïcödé Tïtlé 2024",
            "   ",
            "already_clean_123",
        ] {
            let s = sanitize(title);
            assert!(!s.is_empty());
            assert!(
                s.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "{s:?}"
            );
        }
        assert_eq!(sanitize("Hello, World!"), "hello__world_");
        assert_eq!(sanitize(""), "article");
    }

    #[test]
    fn sanitize_counts_utf16_units() {
        assert_eq!(sanitize("a😀b"), "a__b");
        assert_eq!(sanitize("café"), "caf_");
    }

    #[test]
    fn filename_is_deterministic_for_title_and_time() {
        assert_eq!(
            staged_filename(Some("Best Pizza"), 1_700_000_000_000),
            "best_pizza_1700000000000.html"
        );
        assert_eq!(
            staged_filename(Some("Best Pizza"), 1_700_000_000_000),
            staged_filename(Some("Best Pizza"), 1_700_000_000_000)
        );
        assert_ne!(
            staged_filename(Some("Best Pizza"), 1_700_000_000_000),
            staged_filename(Some("Best Pizza"), 1_700_000_000_001)
        );
        assert_eq!(staged_filename(None, 5), "article_5.html");
    }

    #[test]
    fn filename_allow_list() {
        assert!(is_valid_filename("best_pizza_1700000000000.html"));
        assert!(is_valid_filename("Report-1.html"));
        for bad in [
            "",
            ".html",
            "../secret.html",
            "a/b.html",
            "a\\b.html",
            "C:evil.html",
            "notes.txt",
            "x.html.exe",
            "..",
        ] {
            assert!(!is_valid_filename(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn wrapper_escapes_title_but_not_body() {
        let html = render_document(Some("Fish & <Chips>"), "<h1>Fish</h1>").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Fish &amp; &lt;Chips&gt;</title>"));
        assert!(html.contains("<body>\n    <h1>Fish</h1>\n</body>"));
        assert!(render_document(None, "x")
            .unwrap()
            .contains("<title>Generated Article</title>"));
    }

    #[tokio::test]
    async fn stage_then_retrieve_returns_wrapped_document() {
        let tmp = tempfile::tempdir().unwrap();
        let stager = DownloadStager::new(Arc::new(LocalStorage::new(tmp.path())));

        let staged = stager
            .stage_at(Some("Best Pizza"), "<h1>Best Pizza</h1>", 42)
            .await
            .unwrap();

        assert_eq!(staged.filename, "best_pizza_42.html");
        assert!(staged.file_path.ends_with("best_pizza_42.html"));
        let bytes = stager.retrieve(&staged.filename).await.unwrap();
        assert_eq!(
            bytes,
            render_document(Some("Best Pizza"), "<h1>Best Pizza</h1>")
                .unwrap()
                .into_bytes()
        );
    }

    #[tokio::test]
    async fn empty_article_writes_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let stager = DownloadStager::new(storage.clone());

        let err = stager.stage(Some("t"), "").await.unwrap_err();

        assert!(matches!(err, StagingError::EmptyArticle));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn same_millisecond_collides() {
        let storage = Arc::new(MemoryStorage::new());
        let stager = DownloadStager::new(storage.clone());

        let a = stager.stage_at(Some("Same"), "first", 7).await.unwrap();
        let b = stager.stage_at(Some("Same"), "second", 7).await.unwrap();

        assert_eq!(a.filename, b.filename);
        assert_eq!(storage.len(), 1);
        let body = String::from_utf8(stager.retrieve(&a.filename).await.unwrap()).unwrap();
        assert!(body.contains("second"));
    }

    #[tokio::test]
    async fn retrieve_unknown_or_unsafe_names() {
        let stager = DownloadStager::new(Arc::new(MemoryStorage::new()));
        assert!(matches!(
            stager.retrieve("never_staged_1.html").await,
            Err(StagingError::NotFound)
        ));
        assert!(matches!(
            stager.retrieve("../../etc/passwd").await,
            Err(StagingError::InvalidFilename)
        ));
    }
}
