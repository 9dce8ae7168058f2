use crate::ident::{PackageId, Scope, Version};
use sha2::{Digest, Sha256};

/// Storage key layout and content digests
pub struct ArtifactAddress;

impl ArtifactAddress {
    /// Generate SHA-256 digest of an artifact, with "sha256:" prefix
    pub fn digest(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("sha256:{:x}", hasher.finalize())
    }

    /// Storage key of one published artifact
    /// Example: "packages/acme/components/foo-bar/1.0.0"
    pub fn artifact_key(package: &PackageId, version: &Version) -> String {
        format!(
            "{}/{}",
            Self::package_prefix(package),
            version
        )
    }

    /// Grouping of every version of a package
    /// Example: "packages/acme/libraries/lodash-utils"
    pub fn package_prefix(package: &PackageId) -> String {
        format!(
            "packages/{}/{}/{}",
            package.scope,
            package.kind().collection(),
            package.name
        )
    }

    /// Storage key of a scope's API key record
    /// Example: "keys/acme"
    pub fn key_record(scope: &Scope) -> String {
        format!("keys/{}", scope)
    }
}
