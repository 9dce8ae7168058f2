//! Storage abstraction for registry data

pub mod blob_storage;

pub use blob_storage::{BlobStorage, MemoryStorage, StorageError};

#[cfg(feature = "fs")]
pub mod file_storage;

#[cfg(feature = "fs")]
pub use file_storage::FileStorage;
