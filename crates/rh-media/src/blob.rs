//! Local blob storage for accepted uploads.
//!
//! Files live at `<root>/upload/<folder>/<uuid>.<ext>`. Callers only ever
//! see the root-relative locator (`/upload/<folder>/<uuid>.<ext>`), which is
//! what gets stored in the database; [`BlobStore::resolve`] maps it back.

use std::path::{Component, Path, PathBuf};

use rh_core::{Error, Result};
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

/// Top-level directory under the storage root.
const UPLOAD_DIR: &str = "upload";

/// Which upload folder a blob belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobFolder {
    Videos,
    Thumbs,
}

impl BlobFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobFolder::Videos => "videos",
            BlobFolder::Thumbs => "thumbs",
        }
    }
}

/// A file written by [`BlobStore::store`].
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub id: Uuid,
    /// Root-relative locator, e.g. `/upload/videos/<uuid>.mp4`.
    pub locator: String,
    /// Absolute (or root-joined) filesystem path.
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl StoredBlob {
    /// Size in KiB, rounded up so any non-empty file counts as at least 1.
    pub fn size_kb(&self) -> u64 {
        self.size_bytes.div_ceil(1024)
    }
}

/// Writes and locates upload blobs beneath a root directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `reader` into a new blob.
    ///
    /// The file is created exclusively, flushed and fsynced before this
    /// returns. On failure any partial file is removed.
    pub async fn store<R>(&self, reader: &mut R, folder: BlobFolder, ext: &str) -> Result<StoredBlob>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let dir = self.root.join(UPLOAD_DIR).join(folder.as_str());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::Storage(format!("failed to create folder {}: {e}", dir.display()))
        })?;

        let id = Uuid::new_v4();
        let file_name = format!("{id}.{ext}");
        let path = dir.join(&file_name);

        let size_bytes = match write_new(&path, reader).await {
            Ok(n) => n,
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(Error::Storage(format!(
                    "failed to write {}: {e}",
                    path.display()
                )));
            }
        };

        let locator = format!("/{UPLOAD_DIR}/{}/{file_name}", folder.as_str());
        tracing::debug!(%locator, size_bytes, "Stored blob");

        Ok(StoredBlob {
            id,
            locator,
            path,
            size_bytes,
        })
    }

    /// Copy an existing file (typically an upload spool) into a new blob.
    pub async fn store_file(&self, src: &Path, folder: BlobFolder, ext: &str) -> Result<StoredBlob> {
        let mut file = tokio::fs::File::open(src).await.map_err(|e| {
            Error::Storage(format!("failed to reopen {}: {e}", src.display()))
        })?;
        self.store(&mut file, folder, ext).await
    }

    /// Map a stored locator back to a path under the root.
    ///
    /// Only `upload/...` locators made of plain path segments are accepted.
    pub fn resolve(&self, locator: &str) -> Result<PathBuf> {
        let relative = Path::new(locator.strip_prefix('/').unwrap_or(locator));

        let mut components = relative.components();
        let starts_in_upload = matches!(
            components.next(),
            Some(Component::Normal(first)) if first == UPLOAD_DIR
        );
        let plain = components.all(|c| matches!(c, Component::Normal(_)));
        if !starts_in_upload || !plain {
            return Err(Error::Validation(format!("invalid blob locator: {locator}")));
        }

        Ok(self.root.join(relative))
    }

    /// Remove a blob that will not be referenced. Failures are logged only.
    pub async fn discard(&self, blob: &StoredBlob) {
        if let Err(e) = tokio::fs::remove_file(&blob.path).await {
            tracing::warn!(locator = %blob.locator, error = %e, "Failed to discard blob");
        }
    }
}

async fn write_new<R>(path: &Path, reader: &mut R) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    let n = tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(n)
}
