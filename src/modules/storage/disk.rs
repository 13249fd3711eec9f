use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};

/// Disk-backed file storage.
///
/// Keys are relative, slash-separated paths (e.g. `letters/<uuid>.pdf`)
/// resolved under the configured root. Keys are generated by this service,
/// never taken from request input, but [`resolve`](Self::resolve) still
/// rejects anything that would escape the root.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.root).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create storage root {}: {}",
                config.root.display(),
                e
            ))
        })?;

        Ok(Self { root: config.root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a storage key under `prefix` for a file with the given
    /// extension.
    pub fn generate_key(&self, prefix: &str, extension: &str) -> String {
        format!("{}/{}.{}", prefix, Uuid::new_v4(), extension)
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.is_absolute() {
            return Err(AppError::BadRequest(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(relative))
    }

    /// Write `data` under `key`, creating parent directories as needed.
    pub async fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store {}: {}", key, e)))?;

        debug!("Stored file: {} ({} bytes)", key, data.len());
        Ok(())
    }

    /// Read the full contents of the object at `key`.
    ///
    /// Returns NotFound when the backing object is missing, so a dangling
    /// `file_path` reference surfaces as a user-visible message.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found".to_string()))
            }
            Err(e) => Err(AppError::Internal(format!("Failed to read {}: {}", key, e))),
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Remove the object at `key`. Removing a missing object is not an
    /// error; the row referencing it may already be ahead of the disk.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted file: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!(
                "Failed to delete {}: {}",
                key, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_storage() -> DiskStorage {
        let root = std::env::temp_dir()
            .join("arsip-surat-test")
            .join(Uuid::new_v4().to_string());
        DiskStorage::new(StorageConfig { root }).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_read_delete_roundtrip() {
        let storage = temp_storage().await;
        let key = storage.generate_key("letters", "pdf");

        storage.store(&key, b"%PDF-1.4 test").await.unwrap();
        assert!(storage.exists(&key).await.unwrap());
        assert_eq!(storage.read(&key).await.unwrap(), b"%PDF-1.4 test");

        storage.delete(&key).await.unwrap();
        assert!(!storage.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let storage = temp_storage().await;
        let err = storage.read("letters/missing.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let storage = temp_storage().await;
        storage.delete("letters/missing.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_key_rejected() {
        let storage = temp_storage().await;
        let err = storage.read("../outside.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_generate_key_shape() {
        let storage = DiskStorage {
            root: PathBuf::from("/tmp"),
        };
        let key = storage.generate_key("letters", "pdf");
        assert!(key.starts_with("letters/"));
        assert!(key.ends_with(".pdf"));
    }
}
