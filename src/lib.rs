//! Blob-storage normalization layer for Google Cloud Storage.
//!
//! Translates between GCS's native metadata/header vocabulary and a
//! neutral, S3-like one (`Key`, `ETag`, `Size`, `LastModified`, ...), so
//! hosting processes can swap storage backends without changing call
//! sites. Reads with a public ACL bypass the authenticated client and hit
//! the anonymous object endpoint directly.

pub mod adapters;
pub mod model;
pub mod util;

pub use adapters::{gcs::GcsStorage, mock::MockStorage, BlobStorage};
pub use model::{
    error::StorageError,
    info::{Acl, FetchOptions, FileInfo, ListOptions, ListPage, StorageOptions, StoreFile},
};
