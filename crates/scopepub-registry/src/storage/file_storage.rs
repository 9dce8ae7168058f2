//! Filesystem blob storage
//!
//! Keys map onto paths below a base directory. Writes go to a temporary file
//! next to the target first, so readers never observe a partially written
//! artifact.

use super::blob_storage::{BlobStorage, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base path
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to a path, refusing anything that could escape the base
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty key".to_string()));
        }

        let mut path = self.base_path.clone();
        for segment in key.split('/') {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('\\')
                || segment.contains('\0')
            {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }

        Ok(path)
    }

    /// Create the parent directories of `path` and return a sibling temp path
    async fn prepare(&self, path: &Path) -> Result<PathBuf, StorageError> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidKey(path.display().to_string()))?;

        fs::create_dir_all(parent)
            .await
            .map_err(|e| backend("Failed to create directory", parent, e))?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StorageError::InvalidKey(path.display().to_string()))?;

        Ok(parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4())))
    }
}

fn backend(action: &str, path: &Path, error: std::io::Error) -> StorageError {
    StorageError::Backend(format!("{} {}: {}", action, path.display(), error))
}

/// Write `data` to the temp file, removing whatever was written if it fails
async fn stage(temp: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Err(e) = fs::write(temp, data).await {
        let _ = fs::remove_file(temp).await;
        return Err(backend("Failed to write", temp, e));
    }
    Ok(())
}

#[async_trait]
impl BlobStorage for FileStorage {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let temp = self.prepare(&path).await?;

        stage(&temp, &data).await?;

        // rename replaces the target atomically
        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(backend("Failed to move into place", &path, e));
        }

        Ok(())
    }

    async fn put_if_absent(&self, key: &str, data: Vec<u8>) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        let temp = self.prepare(&path).await?;

        stage(&temp, &data).await?;

        // hard_link fails if the target exists, making check-and-create one step
        let linked = fs::hard_link(&temp, &path).await;
        let _ = fs::remove_file(&temp).await;

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(backend("Failed to create", &path, e)),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;

        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => backend("Failed to read", &path, e),
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;

        fs::try_exists(&path)
            .await
            .map_err(|e| backend("Failed to stat", &path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_creates_intermediate_directories() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let key = "packages/acme/components/foo-bar/1.0.0";

        storage.put(key, b"v1".to_vec()).await.unwrap();

        let on_disk = std::fs::read(dir.path().join(key)).unwrap();
        assert_eq!(on_disk, b"v1".to_vec());
        assert!(storage.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let key = "packages/acme/libraries/utils/latest";

        storage.put(key, b"first".to_vec()).await.unwrap();
        storage.put(key, b"second".to_vec()).await.unwrap();

        assert_eq!(storage.get(key).await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_put_if_absent_keeps_first_write() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let key = "packages/acme/components/foo-bar/2";

        assert!(storage.put_if_absent(key, b"first".to_vec()).await.unwrap());
        assert!(!storage.put_if_absent(key, b"second".to_vec()).await.unwrap());
        assert_eq!(storage.get(key).await.unwrap(), b"first".to_vec());

        // No temp files are left behind
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("packages/acme/components/foo-bar"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.get("keys/acme").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!storage.exists("keys/acme").await.unwrap());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join(".latest.tmp");

        // /dev/full rejects every write with ENOSPC
        std::os::unix::fs::symlink("/dev/full", &temp).unwrap();

        let result = stage(&temp, b"export default 1").await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
        assert!(std::fs::symlink_metadata(&temp).is_err());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        for key in ["", "../etc/passwd", "a//b", "a/./b", "/abs"] {
            assert!(
                matches!(
                    storage.put(key, b"x".to_vec()).await,
                    Err(StorageError::InvalidKey(_))
                ),
                "{key:?} should be refused"
            );
        }
    }
}
