//! Upload staging.
//!
//! A [`Spool`] receives an upload chunk by chunk, writes it to a temp file
//! in the staging directory and keeps the first [`SNIFF_LEN`] bytes in
//! memory for content sniffing. The temp file is removed when the spool is
//! dropped, so an abandoned request leaves nothing behind.

use std::path::Path;

use rh_core::{Error, Result};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::sniff::SNIFF_LEN;

/// A partially or fully received upload on disk.
pub struct Spool {
    file: NamedTempFile,
    writer: tokio::fs::File,
    prefix: Vec<u8>,
    len: u64,
}

fn spool_err(action: &str, e: std::io::Error) -> Error {
    Error::Storage(format!("failed to {action} upload spool: {e}"))
}

impl Spool {
    /// Create an empty spool inside `dir`, creating the directory if needed.
    pub fn new_in(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| spool_err("create", e))?;
        let file = NamedTempFile::new_in(dir).map_err(|e| spool_err("create", e))?;
        let handle = file.as_file().try_clone().map_err(|e| spool_err("open", e))?;

        Ok(Self {
            file,
            writer: tokio::fs::File::from_std(handle),
            prefix: Vec::with_capacity(SNIFF_LEN),
            len: 0,
        })
    }

    /// Append a chunk of upload data.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let room = SNIFF_LEN - self.prefix.len();
        if room > 0 {
            self.prefix.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
        self.writer
            .write_all(chunk)
            .await
            .map_err(|e| spool_err("write", e))?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered writes so the file can be reopened from offset 0.
    pub async fn finish(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(|e| spool_err("flush", e))
    }

    /// The leading bytes seen so far (at most [`SNIFF_LEN`]).
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Total bytes written.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Location of the temp file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl std::fmt::Debug for Spool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spool")
            .field("path", &self.file.path())
            .field("len", &self.len)
            .finish()
    }
}
