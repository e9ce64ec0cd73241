//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::ReaderStream;
use tracing::debug;

use dropshare_core::error::{AppError, ErrorKind};
use dropshare_core::result::AppResult;
use dropshare_core::traits::storage::{
    ByteStream, PayloadWriter, StorageObjectMeta, StorageProvider,
};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory of this provider.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to an absolute path within the root.
    ///
    /// Anything that could escape the root (`..`, absolute prefixes) is
    /// rejected.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AppError::validation(format!("Invalid storage path: {path}")));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn open_error(path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("File not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to open file: {path}"), e)
    }
}

/// Streaming writer for one payload file.
struct LocalPayloadWriter {
    path: String,
    file: BufWriter<fs::File>,
    written: u64,
}

#[async_trait]
impl PayloadWriter for LocalPayloadWriter {
    async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()> {
        self.file.write_all(chunk).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write chunk: {}", self.path),
                e,
            )
        })?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> AppResult<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush file", e))?;
        self.file
            .get_ref()
            .sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to sync file", e))?;
        debug!(path = %self.path, bytes = self.written, "Wrote file from stream");
        Ok(self.written)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                "Storage health check failed",
                e,
            )),
        }
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| open_error(path, e))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream))
    }

    async fn create_writer(&self, path: &str) -> AppResult<Box<dyn PayloadWriter>> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        let file = fs::File::create(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create file: {path}"),
                e,
            )
        })?;

        Ok(Box::new(LocalPayloadWriter {
            path: path.to_string(),
            file: BufWriter::new(file),
            written: 0,
        }))
    }

    async fn delete_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_dir_all(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete directory: {path}"),
                e,
            )),
        }
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {from} -> {to}"),
                e,
            )
        })?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to stat path", e))
    }

    async fn list(&self, path: &str) -> AppResult<Vec<StorageObjectMeta>> {
        let full_path = self.resolve(path)?;
        let mut dir = match fs::read_dir(&full_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list directory: {path}"),
                    e,
                ));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let entry_meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Removed while listing.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        "Failed to get entry metadata",
                        e,
                    ));
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = if path.is_empty() || path == "/" {
                name
            } else {
                format!("{}/{}", path.trim_end_matches('/'), name)
            };

            entries.push(StorageObjectMeta {
                mime_type: if entry_meta.is_file() {
                    mime_from_path(&entry_path)
                } else {
                    None
                },
                path: entry_path,
                size_bytes: entry_meta.len(),
                last_modified: entry_meta
                    .modified()
                    .ok()
                    .map(chrono::DateTime::<chrono::Utc>::from),
                is_directory: entry_meta.is_dir(),
            });
        }

        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then(a.path.cmp(&b.path))
        });

        Ok(entries)
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        fs::create_dir_all(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {path}"),
                e,
            )
        })?;
        Ok(())
    }
}

/// Guess MIME type from a file path extension.
pub fn mime_from_path(path: &str) -> Option<String> {
    let (_, ext) = path.rsplit_once('.')?;
    let mime = match ext.to_lowercase().as_str() {
        "txt" | "log" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::TryStreamExt;

    async fn write_file(provider: &LocalStorageProvider, path: &str, data: &[u8]) -> u64 {
        let mut writer = provider.create_writer(path).await.unwrap();
        writer.write_chunk(data).await.unwrap();
        writer.finish().await.unwrap()
    }

    async fn read_file(provider: &LocalStorageProvider, path: &str) -> Vec<u8> {
        let chunks: Vec<Bytes> = provider.read(path).await.unwrap().try_collect().await.unwrap();
        chunks.concat()
    }

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().join("uploads"))
            .await
            .unwrap();
        (dir, provider)
    }

    #[tokio::test]
    async fn test_write_read_delete_dir() {
        let (_dir, provider) = provider().await;

        assert_eq!(write_file(&provider, "share/000-file.txt", b"hello world").await, 11);
        assert!(provider.exists("share/000-file.txt").await.unwrap());
        assert_eq!(read_file(&provider, "share/000-file.txt").await, b"hello world");

        provider.delete_dir("share").await.unwrap();
        assert!(!provider.exists("share").await.unwrap());
        provider.delete_dir("share").await.unwrap();
    }

    #[tokio::test]
    async fn test_chunked_writer_counts_bytes() {
        let (_dir, provider) = provider().await;
        let mut writer = provider.create_writer("s/000-big.bin").await.unwrap();
        writer.write_chunk(&[1u8; 1000]).await.unwrap();
        writer.write_chunk(&[2u8; 24]).await.unwrap();
        assert_eq!(writer.finish().await.unwrap(), 1024);

        let entries = provider.list("s").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "s/000-big.bin");
        assert_eq!(entries[0].size_bytes, 1024);
        assert!(!entries[0].is_directory);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, provider) = provider().await;
        let Err(err) = provider.read("nope/000-x").await else {
            panic!("missing file opened");
        };
        assert!(err.is_not_found());
        assert!(provider.list("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let (_dir, provider) = provider().await;
        let Err(err) = provider.read("../secret").await else {
            panic!("escaping path opened");
        };
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(provider.delete_dir("a/../../b").await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_rename() {
        let (_dir, provider) = provider().await;
        write_file(&provider, "a/000-x.txt", b"x").await;
        provider.create_dir("b").await.unwrap();

        let entries = provider.list("").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.is_directory));

        provider.rename("a", "c").await.unwrap();
        assert!(!provider.exists("a").await.unwrap());
        assert!(provider.exists("c/000-x.txt").await.unwrap());
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(mime_from_path("file.pdf"), Some("application/pdf".into()));
        assert_eq!(mime_from_path("img.PNG"), Some("image/png".into()));
        assert_eq!(mime_from_path("noext"), None);
    }
}
