//! Publish workflow
//!
//! A publish runs a fixed sequence of checks and stops at the first failure:
//! specifier, API key presence, scope, name, authentication, version, source,
//! and finally the store write. Nothing is written unless every check passes.

use crate::{
    auth::{ApiKeyAuthenticator, AuthDecision, KeyLookup, StorageKeyLookup},
    error::{PublishError, RegistryError, Rejection},
    ident::{self, PackageId, PackageKind, PackageName, Scope, Version},
    storage::BlobStorage,
    version_store::{PutOutcome, VersionStore},
};
use std::sync::Arc;
use time::OffsetDateTime;

/// Where the package name and version come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageTarget {
    /// `name` or `name@version`
    Specifier(String),
    /// Name and version supplied as separate fields
    Fields {
        name: String,
        version: Option<String>,
    },
}

impl PackageTarget {
    /// Resolve to raw `(name, version)`, defaulting the version to `latest`
    pub fn resolve(&self) -> (&str, &str) {
        match self {
            PackageTarget::Specifier(spec) => ident::split_specifier(spec),
            PackageTarget::Fields { name, version } => {
                (name.as_str(), version.as_deref().unwrap_or(ident::LATEST))
            }
        }
    }
}

/// Already-decoded publish request
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub kind: PackageKind,
    pub scope: String,
    pub target: PackageTarget,
    pub api_key: String,
    pub source: String,
}

impl PublishRequest {
    pub fn new(
        kind: PackageKind,
        scope: impl Into<String>,
        specifier: impl Into<String>,
        api_key: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            scope: scope.into(),
            target: PackageTarget::Specifier(specifier.into()),
            api_key: api_key.into(),
            source: source.into(),
        }
    }
}

/// A successful publish
#[derive(Debug, Clone)]
pub struct Published {
    pub package: PackageId,
    pub version: Version,
    pub digest: String,
    /// A previous `latest` was overwritten
    pub replaced: bool,
    pub published_at: OffsetDateTime,
}

pub struct Publisher<S: BlobStorage, K: KeyLookup> {
    authenticator: ApiKeyAuthenticator<K>,
    store: VersionStore<S>,
}

impl<S: BlobStorage> Publisher<S, StorageKeyLookup<S>> {
    /// Publisher whose key records live in the same storage as the artifacts
    pub fn with_storage(storage: Arc<S>) -> Self {
        Self::new(
            VersionStore::new(storage.clone()),
            ApiKeyAuthenticator::new(StorageKeyLookup::new(storage)),
        )
    }
}

impl<S: BlobStorage, K: KeyLookup> Publisher<S, K> {
    pub fn new(store: VersionStore<S>, authenticator: ApiKeyAuthenticator<K>) -> Self {
        Self {
            authenticator,
            store,
        }
    }

    pub fn store(&self) -> &VersionStore<S> {
        &self.store
    }

    pub async fn publish(&self, request: PublishRequest) -> Result<Published, PublishError> {
        let (raw_name, raw_version) = request.target.resolve();

        if request.api_key.trim().is_empty() {
            return Err(Rejection::MissingApiKey.into());
        }

        let scope = Scope::parse(&request.scope).map_err(Rejection::from)?;
        let name = PackageName::parse(request.kind, raw_name).map_err(Rejection::from)?;

        match self.authenticator.authenticate(&scope, &request.api_key).await? {
            AuthDecision::Authorized => {}
            AuthDecision::Unauthorized => return Err(Rejection::InvalidApiKey.into()),
        }

        let version = Version::parse(raw_version).map_err(Rejection::from)?;

        if request.source.trim().is_empty() {
            return Err(Rejection::InvalidSource.into());
        }

        let package = PackageId::new(scope, name);

        match self.store.put(&package, &version, &request.source).await? {
            PutOutcome::Written(receipt) => Ok(Published {
                package,
                version,
                digest: receipt.digest,
                replaced: receipt.replaced,
                published_at: OffsetDateTime::now_utc(),
            }),
            PutOutcome::Conflict { version } => Err(Rejection::VersionConflict {
                version: version.to_string(),
            }
            .into()),
            PutOutcome::Invalid { key, reason } => {
                Err(RegistryError::InvalidStorageKey { key, reason }.into())
            }
        }
    }
}
