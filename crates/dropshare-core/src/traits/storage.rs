//! Storage provider trait for share payloads.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Path within the storage provider.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type guessed from the extension (if known).
    pub mime_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
    /// Whether this is a directory.
    pub is_directory: bool,
}

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// An open file being written chunk by chunk.
///
/// Nothing is guaranteed to be durable until [`PayloadWriter::finish`]
/// returns. Dropping a writer without finishing leaves a partial file that
/// the caller is expected to remove.
#[async_trait]
pub trait PayloadWriter: Send {
    /// Append a chunk to the file.
    async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()>;

    /// Flush and close the file, returning the number of bytes written.
    async fn finish(self: Box<Self>) -> AppResult<u64>;
}

/// Trait for payload storage backends.
///
/// The trait is defined here in `dropshare-core` and implemented in
/// `dropshare-storage`. Paths are relative to the provider's root and use
/// `/` as separator.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a file and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Open a file for chunked writing, creating parent directories.
    async fn create_writer(&self, path: &str) -> AppResult<Box<dyn PayloadWriter>>;

    /// Delete a directory and all its contents recursively.
    ///
    /// Deleting a directory that does not exist succeeds.
    async fn delete_dir(&self, path: &str) -> AppResult<()>;

    /// Move (rename) a file or directory within this provider.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether a file or directory exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// List the contents of a directory.
    async fn list(&self, path: &str) -> AppResult<Vec<StorageObjectMeta>>;

    /// Create a directory (and any missing parents).
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}
