//! Shared test harness for integration tests.
//!
//! [`TestHarness`] owns a temp SQLite file, a temp storage root and a fake
//! duration probe. [`TestHarness::with_server`] starts Axum on a random port
//! for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rh_av::DurationProbe;
use rh_core::config::Config;
use rh_db::pool::{init_pool, DbPool};
use rh_server::context::AppContext;
use rh_server::router::build_router;

/// Probe double: a fixed answer, or a failure like a missing ffprobe.
#[derive(Debug, Clone, Copy)]
pub enum FakeProbe {
    Seconds(u32),
    Failing,
}

#[async_trait]
impl DurationProbe for FakeProbe {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn probe_duration(&self, _path: &Path) -> rh_core::Result<u32> {
        match self {
            FakeProbe::Seconds(s) => Ok(*s),
            FakeProbe::Failing => Err(rh_core::Error::tool("ffprobe", "not installed")),
        }
    }
}

pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    /// Kept alive for the lifetime of the harness.
    pub storage: tempfile::TempDir,
}

impl TestHarness {
    pub fn new(probe: FakeProbe) -> Self {
        let storage = tempfile::tempdir().expect("failed to create storage root");
        let mut config = Config::default();
        config.storage.root = storage.path().to_path_buf();

        // Shared-cache memory DBs reject concurrent writers with SQLITE_LOCKED.
        let db_path = storage.path().join("reelhouse-test.db");
        let db = init_pool(&db_path.to_string_lossy()).expect("failed to create test pool");
        let ctx = AppContext::new(db.clone(), config, Arc::new(probe));

        Self { ctx, db, storage }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server(probe: FakeProbe) -> (Self, SocketAddr) {
        let harness = Self::new(probe);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn conn(&self) -> rh_db::pool::PooledConnection {
        rh_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .expect("count query failed")
    }

    pub fn blob_dir(&self, folder: &str) -> PathBuf {
        self.storage.path().join("upload").join(folder)
    }

    /// Number of files in `upload/<folder>`.
    pub fn count_blobs(&self, folder: &str) -> usize {
        match std::fs::read_dir(self.blob_dir(folder)) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    /// Files left in the staging directory.
    pub fn count_staged(&self) -> usize {
        match std::fs::read_dir(self.ctx.staging_dir()) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Bytes that sniff as `video/mp4`, padded with a deterministic pattern up
/// to `len` bytes.
pub fn mp4_bytes(len: usize) -> Vec<u8> {
    let mut v = vec![0, 0, 0, 24];
    v.extend_from_slice(b"ftypisom");
    v.extend_from_slice(&[0, 0, 2, 0]);
    v.extend_from_slice(b"isommp41");
    let mut i: u32 = 0;
    while v.len() < len {
        v.push((i % 251) as u8);
        i += 1;
    }
    v.truncate(len.max(24));
    v
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut v = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    v.extend_from_slice(b"JFIF\0");
    v.resize(2048, 0x42);
    v
}

pub fn png_bytes() -> Vec<u8> {
    let mut v = b"\x89PNG\r\n\x1a\n".to_vec();
    v.resize(512, 0);
    v
}

pub fn file_part(bytes: Vec<u8>, name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes).file_name(name.to_string())
}

/// A complete movie form.
pub fn movie_form(title: &str, video: Vec<u8>, thumbnail: Option<Vec<u8>>) -> reqwest::multipart::Form {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("description", "A test upload")
        .part("video", file_part(video, "movie.mp4"));
    match thumbnail {
        Some(t) => form.part("thumbnail", file_part(t, "thumb.jpg")),
        None => form,
    }
}

pub async fn post_form(addr: SocketAddr, path: &str, form: reqwest::multipart::Form) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .multipart(form)
        .send()
        .await
        .expect("request failed")
}

/// Upload a movie and return the 201 body.
pub async fn upload_movie(addr: SocketAddr, video: Vec<u8>) -> serde_json::Value {
    let resp = post_form(addr, "/movies", movie_form("Test Movie", video, Some(jpeg_bytes()))).await;
    assert_eq!(resp.status(), 201, "upload failed");
    resp.json().await.expect("invalid JSON")
}
