//! Version store: immutable pinned versions plus a mutable `latest` alias

use crate::{
    address::ArtifactAddress,
    error::Result,
    ident::{PackageId, Version},
    storage::{BlobStorage, StorageError},
};
use std::sync::Arc;

/// Proof of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub key: String,
    pub digest: String,
    /// A previous `latest` was overwritten
    pub replaced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Written(WriteReceipt),
    /// The pinned version already exists; nothing was written
    Conflict { version: Version },
    /// The backend refused the storage key
    Invalid { key: String, reason: String },
}

pub struct VersionStore<S: BlobStorage> {
    storage: Arc<S>,
}

impl<S: BlobStorage> VersionStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Write `artifact` at `version` of `package`.
    ///
    /// `latest` is always overwritten. A pinned version is created only if
    /// absent, in one atomic step, so concurrent first publishes of the same
    /// version produce exactly one `Written`.
    pub async fn put(
        &self,
        package: &PackageId,
        version: &Version,
        artifact: &str,
    ) -> Result<PutOutcome> {
        let key = ArtifactAddress::artifact_key(package, version);
        let digest = ArtifactAddress::digest(artifact.as_bytes());
        let data = artifact.as_bytes().to_vec();

        let written = match version {
            Version::Latest => match self.storage.exists(&key).await {
                Ok(replaced) => self.storage.put(&key, data).await.map(|()| Some(replaced)),
                Err(e) => Err(e),
            },
            Version::Pinned(_) => self
                .storage
                .put_if_absent(&key, data)
                .await
                .map(|created| created.then_some(false)),
        };

        match written {
            Ok(Some(replaced)) => Ok(PutOutcome::Written(WriteReceipt {
                key,
                digest,
                replaced,
            })),
            Ok(None) => Ok(PutOutcome::Conflict { version: *version }),
            Err(StorageError::InvalidKey(reason)) => Ok(PutOutcome::Invalid { key, reason }),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, package: &PackageId, version: &Version) -> Result<bool> {
        let key = ArtifactAddress::artifact_key(package, version);
        Ok(self.storage.exists(&key).await?)
    }

    /// Stored artifact at `version`, if any
    pub async fn get(&self, package: &PackageId, version: &Version) -> Result<Option<Vec<u8>>> {
        let key = ArtifactAddress::artifact_key(package, version);
        match self.storage.get(&key).await {
            Ok(data) => Ok(Some(data)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{PackageKind, PackageName, Scope};
    use crate::storage::MemoryStorage;

    fn foo_bar() -> PackageId {
        PackageId::new(
            Scope::parse("acme").unwrap(),
            PackageName::parse(PackageKind::Component, "foo-bar").unwrap(),
        )
    }

    fn store() -> VersionStore<MemoryStorage> {
        VersionStore::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_pinned_version_is_immutable() {
        let store = store();
        let package = foo_bar();
        let version = Version::parse("1.0.0").unwrap();

        let first = store.put(&package, &version, "content a").await.unwrap();
        assert!(matches!(first, PutOutcome::Written(ref r) if !r.replaced));

        let second = store.put(&package, &version, "content b").await.unwrap();
        assert_eq!(second, PutOutcome::Conflict { version });

        let stored = store.get(&package, &version).await.unwrap().unwrap();
        assert_eq!(stored, b"content a".to_vec());
    }

    #[tokio::test]
    async fn test_latest_is_overwritten() {
        let store = store();
        let package = foo_bar();

        let first = store.put(&package, &Version::Latest, "one").await.unwrap();
        assert!(matches!(first, PutOutcome::Written(ref r) if !r.replaced));

        let second = store.put(&package, &Version::Latest, "two").await.unwrap();
        assert!(matches!(second, PutOutcome::Written(ref r) if r.replaced));

        let stored = store.get(&package, &Version::Latest).await.unwrap().unwrap();
        assert_eq!(stored, b"two".to_vec());
    }

    #[tokio::test]
    async fn test_versions_are_independent() {
        let store = store();
        let package = foo_bar();
        let v1 = Version::parse("1").unwrap();
        let v2 = Version::parse("2").unwrap();

        store.put(&package, &v1, "one").await.unwrap();
        assert!(!store.exists(&package, &v2).await.unwrap());
        assert!(matches!(
            store.put(&package, &v2, "two").await.unwrap(),
            PutOutcome::Written(_)
        ));
        assert!(store.get(&package, &Version::Latest).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_receipt_carries_key_and_digest() {
        let store = store();
        let outcome = store
            .put(&foo_bar(), &Version::parse("2.0.1").unwrap(), "hello")
            .await
            .unwrap();

        match outcome {
            PutOutcome::Written(receipt) => {
                assert_eq!(receipt.key, "packages/acme/components/foo-bar/2.0.1");
                assert_eq!(receipt.digest, ArtifactAddress::digest(b"hello"));
            }
            other => panic!("Expected Written, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_publishes_have_one_winner() {
        let store = Arc::new(store());
        let package = foo_bar();
        let version = Version::parse("5.0.0").unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let package = package.clone();
            handles.push(tokio::spawn(async move {
                store.put(&package, &version, &format!("writer {}", i)).await
            }));
        }

        let mut written = 0;
        for handle in handles {
            if let PutOutcome::Written(_) = handle.await.unwrap().unwrap() {
                written += 1;
            }
        }
        assert_eq!(written, 1);
    }
}
