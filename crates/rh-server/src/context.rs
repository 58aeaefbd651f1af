//! Application context shared by all route handlers via Axum state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rh_av::DurationProbe;
use rh_core::config::Config;
use rh_db::pool::{DbPool, PooledConnection};
use rh_media::BlobStore;

/// Everything a request handler needs.
///
/// Cheaply cloneable because it only holds `Arc`s and the pool handle.
/// Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Blob storage rooted at `storage.root`.
    pub blobs: Arc<BlobStore>,
    /// Duration probe for uploaded videos.
    pub probe: Arc<dyn DurationProbe>,
    staging_dir: Arc<PathBuf>,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config, probe: Arc<dyn DurationProbe>) -> Self {
        let blobs = Arc::new(BlobStore::new(config.storage.root.clone()));
        let staging_dir = Arc::new(config.storage.staging_dir());
        Self {
            db,
            config: Arc::new(config),
            blobs,
            probe,
            staging_dir,
        }
    }

    /// Directory for upload spools.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Run a blocking database operation on the blocking thread pool.
    ///
    /// The closure receives a pooled connection; the async caller never
    /// holds one across an await point.
    pub async fn with_conn<T, F>(&self, f: F) -> rh_core::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PooledConnection) -> rh_core::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rh_db::pool::get_conn(&db)?;
            f(&conn)
        })
        .await
        .map_err(|e| rh_core::Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}
