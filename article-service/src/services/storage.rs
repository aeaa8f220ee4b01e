use async_trait::async_trait;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat key/value store for staged artifacts.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `key`, replacing any previous value. Returns where it landed.
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<String, StorageError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn health_check(&self) -> Result<(), StorageError>;
}

/// Keys must be a single plain path component.
fn check_key(key: &str) -> Result<(), StorageError> {
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !key.contains(['/', '\\']) => Ok(()),
        _ => Err(StorageError::InvalidKey(key.to_string())),
    }
}

/// Files in one directory on local disk.
///
/// The directory is created on first write. Writes are plain overwrites with
/// no fsync and no atomic rename.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<String, StorageError> {
        check_key(key)?;
        fs::create_dir_all(&self.base_path).await?;

        let path = self.base_path.join(key);
        fs::write(&path, data).await?;

        let location = fs::canonicalize(&path).await.unwrap_or(path);
        Ok(location.display().to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        check_key(key)?;
        let path = self.base_path.join(key);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path).await?;
        let metadata = fs::metadata(&self.base_path).await?;
        if metadata.permissions().readonly() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!("{} is read-only", self.base_path.display()),
            )));
        }
        Ok(())
    }
}

/// In-process store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStorage {
    objects: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<String, StorageError> {
        check_key(key)?;
        self.objects.insert(key.to_string(), data);
        Ok(format!("memory://{}", key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        check_key(key)?;
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
