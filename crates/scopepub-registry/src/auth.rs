//! Scope-based API key authentication

use crate::{
    address::ArtifactAddress,
    error::{RegistryError, Result},
    ident::Scope,
    storage::{BlobStorage, StorageError},
};
use async_trait::async_trait;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Source of the stored API key for a scope
#[async_trait]
pub trait KeyLookup: Send + Sync {
    /// Stored key of `scope`, or `None` when the scope has no key record
    async fn get(&self, scope: &Scope) -> Result<Option<String>>;
}

/// Reads key records from blob storage at `keys/{scope}`
pub struct StorageKeyLookup<S: BlobStorage> {
    storage: Arc<S>,
}

impl<S: BlobStorage> StorageKeyLookup<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: BlobStorage> KeyLookup for StorageKeyLookup<S> {
    async fn get(&self, scope: &Scope) -> Result<Option<String>> {
        let key = ArtifactAddress::key_record(scope);

        match self.storage.get(&key).await {
            Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
                RegistryError::InvalidKeyRecord {
                    scope: scope.to_string(),
                }
            }),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized,
    Unauthorized,
}

/// Compares a supplied key against the scope's stored key
pub struct ApiKeyAuthenticator<K: KeyLookup> {
    lookup: K,
}

impl<K: KeyLookup> ApiKeyAuthenticator<K> {
    pub fn new(lookup: K) -> Self {
        Self { lookup }
    }

    pub async fn authenticate(&self, scope: &Scope, supplied: &str) -> Result<AuthDecision> {
        let supplied = supplied.trim();
        if supplied.is_empty() {
            return Ok(AuthDecision::Unauthorized);
        }

        let stored = match self.lookup.get(scope).await? {
            Some(stored) => stored,
            None => return Ok(AuthDecision::Unauthorized),
        };
        let stored = stored.trim();
        if stored.is_empty() {
            return Ok(AuthDecision::Unauthorized);
        }

        if bool::from(stored.as_bytes().ct_eq(supplied.as_bytes())) {
            Ok(AuthDecision::Authorized)
        } else {
            Ok(AuthDecision::Unauthorized)
        }
    }
}
