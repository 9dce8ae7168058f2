//! Error types for the scopepub registry

use crate::ident::PackageKind;
use crate::storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Registry-specific errors
///
/// These are faults of a collaborator (storage, key records), never a
/// judgement about the request itself. See [`Rejection`] for the latter.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Key record for scope {scope} is not valid UTF-8")]
    InvalidKeyRecord { scope: String },

    #[error("Storage refused key {key}: {reason}")]
    InvalidStorageKey { key: String, reason: String },
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Identifier grammar violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    #[error("Invalid scope {value:?}: expected {expected}")]
    InvalidScope {
        value: String,
        expected: &'static str,
    },

    #[error("Invalid {kind} name {value:?}: expected {expected}")]
    InvalidName {
        kind: PackageKind,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid version {value:?}: expected {expected}")]
    InvalidVersion {
        value: String,
        expected: &'static str,
    },
}

/// Reasons a publish request is turned down
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Missing API key")]
    MissingApiKey,

    #[error(transparent)]
    Identifier(#[from] IdentError),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid source: must not be empty")]
    InvalidSource,

    #[error("Version {version} was already published")]
    VersionConflict { version: String },
}

/// Flat tag for a [`Rejection`], stable across message wording changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidScope,
    InvalidName,
    InvalidVersion,
    InvalidSource,
    MissingApiKey,
    InvalidApiKey,
    VersionConflict,
}

impl Rejection {
    pub fn reason(&self) -> RejectReason {
        match self {
            Rejection::MissingApiKey => RejectReason::MissingApiKey,
            Rejection::Identifier(IdentError::InvalidScope { .. }) => RejectReason::InvalidScope,
            Rejection::Identifier(IdentError::InvalidName { .. }) => RejectReason::InvalidName,
            Rejection::Identifier(IdentError::InvalidVersion { .. }) => {
                RejectReason::InvalidVersion
            }
            Rejection::InvalidApiKey => RejectReason::InvalidApiKey,
            Rejection::InvalidSource => RejectReason::InvalidSource,
            Rejection::VersionConflict { .. } => RejectReason::VersionConflict,
        }
    }

    /// Request field the rejection refers to
    pub fn field(&self) -> &'static str {
        match self.reason() {
            RejectReason::InvalidScope => "scope",
            RejectReason::InvalidName => "name",
            RejectReason::InvalidVersion | RejectReason::VersionConflict => "version",
            RejectReason::InvalidSource => "source",
            RejectReason::MissingApiKey | RejectReason::InvalidApiKey => "api_key",
        }
    }
}

/// Outcome of a publish that did not succeed
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Internal failure: {0}")]
    Internal(#[from] RegistryError),
}

impl PublishError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            PublishError::Rejected(rejection) => Some(rejection),
            PublishError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reason_and_field() {
        let rejection = Rejection::from(IdentError::InvalidName {
            kind: PackageKind::Component,
            value: "Foo-Bar".to_string(),
            expected: "x",
        });
        assert_eq!(rejection.reason(), RejectReason::InvalidName);
        assert_eq!(rejection.field(), "name");

        let conflict = Rejection::VersionConflict {
            version: "1.0.0".to_string(),
        };
        assert_eq!(conflict.reason(), RejectReason::VersionConflict);
        assert_eq!(conflict.to_string(), "Version 1.0.0 was already published");
    }

    #[test]
    fn test_auth_messages_are_generic() {
        assert_eq!(Rejection::InvalidApiKey.to_string(), "Invalid API key");
        assert_eq!(Rejection::MissingApiKey.field(), "api_key");
    }

    #[test]
    fn test_ident_message_names_grammar() {
        let err = IdentError::InvalidName {
            kind: PackageKind::Library,
            value: "1abc".to_string(),
            expected: "a lowercase letter followed by lowercase letters or dashes",
        };
        assert_eq!(
            err.to_string(),
            "Invalid library name \"1abc\": expected a lowercase letter followed by lowercase letters or dashes"
        );
    }
}
