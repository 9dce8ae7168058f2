//! # Scopepub Registry
//!
//! Publishing of scoped UI components and shared libraries:
//! - Scope, package name and version grammars
//! - Per-scope API key authentication
//! - Immutable pinned versions with a mutable `latest` alias
//! - Filesystem and in-memory storage backends
//!
//! ## Core Concepts
//!
//! - **Scopes** own packages and exactly one API key
//! - **Components** and **libraries** are the two package kinds, each with
//!   its own name grammar
//! - **Pinned versions** (`3`, `1.2.3`) can be published once and never
//!   overwritten
//! - **`latest`** may be republished at any time
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scopepub_registry::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(MemoryStorage::new());
//! storage.put("keys/acme", b"s3cr3t".to_vec()).await?;
//!
//! let publisher = Publisher::with_storage(storage);
//! let published = publisher
//!     .publish(PublishRequest::new(
//!         PackageKind::Component,
//!         "acme",
//!         "foo-bar@1.0.0",
//!         "s3cr3t",
//!         "export default () => {}",
//!     ))
//!     .await?;
//!
//! println!("Published {}@{} ({})", published.package, published.version, published.digest);
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod auth;
pub mod error;
pub mod ident;
pub mod publish;
pub mod storage;
pub mod version_store;

pub use auth::{ApiKeyAuthenticator, AuthDecision, KeyLookup, StorageKeyLookup};
pub use error::{IdentError, PublishError, RegistryError, RejectReason, Rejection};
pub use ident::{PackageId, PackageKind, PackageName, PinnedVersion, Scope, Version};
pub use publish::{PackageTarget, PublishRequest, Published, Publisher};
pub use storage::{BlobStorage, MemoryStorage, StorageError};
pub use version_store::{PutOutcome, VersionStore, WriteReceipt};

#[cfg(feature = "fs")]
pub use storage::FileStorage;
