use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Owned byte stream returned by [`ArtifactStore::read`].
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid artifact name: {0}")]
    InvalidInput(String),

    /// The path does not exist or is not a regular file. Distinct from `Read`,
    /// which is an I/O failure on a file that is there.
    #[error("no file at {0}")]
    NotFound(String),

    #[error("storage write failed: {0}")]
    Write(#[source] io::Error),

    #[error("storage read failed: {0}")]
    Read(#[source] io::Error),
}

/// Soft outcome of a best-effort file removal. Callers log failures but are
/// never expected to propagate them.
#[derive(Debug)]
pub enum RemoveOutcome {
    Removed,
    AlreadyAbsent,
    Failed(io::Error),
}

/// Maps logical resume uploads to durable, uniquely named files.
///
/// Implementations touch the filesystem exclusively. The registry layers the
/// metadata/ordering policy on top of this seam, and tests swap in a store
/// rooted at a temporary directory.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Produces a fresh storage path for an upload with the given client
    /// filename. Fails with [`StoreError::InvalidInput`] if nothing usable is
    /// left after sanitizing.
    fn reserve_name(&self, original_name: &str) -> Result<String, StoreError>;

    /// Streams `data` to `storage_path`, creating missing parent directories.
    /// A failed or interrupted write never leaves a partial file visible under
    /// the final name.
    async fn write(
        &self,
        storage_path: &str,
        data: BoxStream<'_, io::Result<Bytes>>,
    ) -> Result<(), StoreError>;

    /// Opens `storage_path` for reading as a chunked byte stream.
    async fn read(&self, storage_path: &str) -> Result<ByteStream, StoreError>;

    /// Best-effort delete of `storage_path`.
    async fn remove(&self, storage_path: &str) -> RemoveOutcome;
}

/// Filesystem-backed artifact store rooted at a single directory.
pub struct DiskStore {
    root: PathBuf,
    sequence: AtomicU64,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ArtifactStore for DiskStore {
    fn reserve_name(&self, original_name: &str) -> Result<String, StoreError> {
        let safe = sanitize_filename(original_name);
        if safe.is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "nothing usable left of filename {original_name:?} after sanitizing"
            )));
        }
        // Collision avoidance: the sequence number separates concurrent
        // reservations within this process, the millisecond timestamp
        // separates reservations across process lifetimes.
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        let file_name = format!("{stamp}-{seq:04}_{safe}");
        Ok(self.root.join(file_name).to_string_lossy().into_owned())
    }

    async fn write(
        &self,
        storage_path: &str,
        mut data: BoxStream<'_, io::Result<Bytes>>,
    ) -> Result<(), StoreError> {
        let path = Path::new(storage_path);
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await.map_err(StoreError::Write)?;

        // Stream into a uniquely named temp sibling, then rename into place.
        // The temp path is removed on drop, so an aborted write cleans up
        // after itself instead of leaving a partial file.
        let tmp = tempfile::NamedTempFile::new_in(parent).map_err(StoreError::Write)?;
        let tmp_path = tmp.into_temp_path();

        let mut file = fs::File::create(&tmp_path).await.map_err(StoreError::Write)?;
        while let Some(chunk) = data.next().await {
            let bytes = chunk.map_err(StoreError::Write)?;
            file.write_all(&bytes).await.map_err(StoreError::Write)?;
        }
        file.sync_all().await.map_err(StoreError::Write)?;
        drop(file);

        tmp_path
            .persist(path)
            .map_err(|e| StoreError::Write(e.error))?;
        Ok(())
    }

    async fn read(&self, storage_path: &str) -> Result<ByteStream, StoreError> {
        let meta = match fs::metadata(storage_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(storage_path.to_string()));
            }
            Err(e) => return Err(StoreError::Read(e)),
        };
        if !meta.is_file() {
            return Err(StoreError::NotFound(storage_path.to_string()));
        }

        let file = fs::File::open(storage_path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(storage_path.to_string())
            } else {
                StoreError::Read(e)
            }
        })?;
        Ok(ReaderStream::new(file).boxed())
    }

    async fn remove(&self, storage_path: &str) -> RemoveOutcome {
        match fs::remove_file(storage_path).await {
            Ok(()) => RemoveOutcome::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => RemoveOutcome::AlreadyAbsent,
            Err(e) => RemoveOutcome::Failed(e),
        }
    }
}

/// Keeps only the final path segment of the client-supplied name and replaces
/// whitespace with underscores. Client filenames are display data; they never
/// choose where a file lands on disk.
fn sanitize_filename(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    base.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| *c != '\0')
        .collect()
}
