//! Publish request and response models

use scopepub_registry::{PackageKind, PackageTarget, Published, PublishRequest};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Structured publish payload for `POST /api/publish`
#[derive(Debug, Deserialize)]
pub struct PublishBody {
    pub kind: PackageKind,
    pub scope: String,
    pub name: String,
    pub version: Option<String>,
    pub source: String,
    /// Used only when no key header is sent
    pub api_key: Option<String>,
}

impl PublishBody {
    pub fn into_request(self, header_key: Option<String>) -> PublishRequest {
        PublishRequest {
            kind: self.kind,
            scope: self.scope,
            target: PackageTarget::Fields {
                name: self.name,
                version: self.version,
            },
            api_key: header_key.or(self.api_key).unwrap_or_default(),
            source: self.source,
        }
    }
}

/// Details of a successful publish
#[derive(Debug, Serialize)]
pub struct PublishedDetails {
    pub scope: String,
    pub kind: PackageKind,
    pub name: String,
    pub version: String,
    pub digest: String,
    pub replaced: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

impl From<Published> for PublishedDetails {
    fn from(published: Published) -> Self {
        Self {
            scope: published.package.scope.to_string(),
            kind: published.package.kind(),
            name: published.package.name.to_string(),
            version: published.version.to_string(),
            digest: published.digest,
            replaced: published.replaced,
            published_at: published.published_at,
        }
    }
}
