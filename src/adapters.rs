use async_trait::async_trait;

use crate::model;

pub mod gcs;
pub mod mock;

/// The neutral blob-storage seam. Callers program against this trait so a
/// backend can be swapped without touching call sites.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Retrieves metadata only, no content.
    async fn fetch_info(
        &self,
        file_key: &str,
        opts: model::info::FetchOptions,
    ) -> Result<model::info::FileInfo, model::error::StorageError>;

    /// Retrieves metadata plus the full object body, buffered in memory.
    async fn fetch(
        &self,
        file_key: &str,
        opts: model::info::FetchOptions,
    ) -> Result<(model::info::FileInfo, Vec<u8>), model::error::StorageError>;

    /// Writes the full buffer under `file_key`, deriving upload options
    /// from the neutral header fields, and returns the stored metadata.
    async fn store(
        &self,
        file_key: &str,
        file: model::info::StoreFile,
    ) -> Result<model::info::FileInfo, model::error::StorageError>;

    /// Sets object visibility: an `acl` starting with `public` makes the
    /// object publicly readable, anything else makes it private.
    async fn set_acl(
        &self,
        file_key: &str,
        acl: &str,
    ) -> Result<(), model::error::StorageError>;

    /// Deletes a single object by key.
    async fn remove(&self, file_key: &str) -> Result<(), model::error::StorageError>;

    /// Deletes every object whose key starts with `dir` (normalized to a
    /// `/`-terminated prefix unless root).
    async fn remove_directory(&self, dir: &str) -> Result<(), model::error::StorageError>;

    /// Lists one page of objects under `dir`. Pagination is caller
    /// controlled via `opts.last_key` / `opts.max_keys`.
    async fn list(
        &self,
        dir: &str,
        opts: model::info::ListOptions,
    ) -> Result<model::info::ListPage, model::error::StorageError>;
}
