//! Upload ingestion: multipart parsing, asset checks, storage, probing and
//! aggregate construction.
//!
//! The order is fixed: every uploaded file is sniffed before any of them is
//! stored, so a rejected upload leaves no blob behind. Blobs that were
//! stored but never referenced (build or persist failed) are discarded.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use rh_core::domain::{Content, ContentType, Episode, Movie, Thumbnail, TvShow, Video};
use rh_core::{Error, Result};
use rh_media::blob::BlobFolder;
use rh_media::sniff::extension_for;
use rh_media::{AssetKind, BlobStore, Spool, StoredBlob};

use crate::context::AppContext;

// ---------------------------------------------------------------------------
// Multipart form
// ---------------------------------------------------------------------------

/// Largest accepted text field, in bytes.
pub const MAX_TEXT_FIELD_BYTES: usize = 8 * 1024;

/// A parsed multipart upload: text fields in memory, file fields spooled.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Spool>,
}

impl UploadForm {
    /// Drain `multipart`, spooling the parts named in `file_fields` into
    /// `staging`.
    ///
    /// A repeated file part or an oversized text field rejects the form.
    /// The body is still read to the end so the client receives the error.
    /// Repeated text fields keep their first occurrence.
    pub async fn read(mut multipart: Multipart, file_fields: &[&str], staging: &Path) -> Result<Self> {
        let mut form = Self::default();
        let mut rejection: Option<Error> = None;

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_err)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if rejection.is_some() {
                drain(&mut field).await?;
                continue;
            }

            if file_fields.contains(&name.as_str()) {
                if form.files.contains_key(&name) {
                    rejection = Some(Error::Validation(format!("only one {name} file is allowed")));
                    drain(&mut field).await?;
                    continue;
                }
                let mut spool = Spool::new_in(staging)?;
                while let Some(chunk) = field.chunk().await.map_err(multipart_err)? {
                    spool.write_chunk(&chunk).await?;
                }
                spool.finish().await?;
                tracing::debug!(field = %name, bytes = spool.len(), "Spooled upload part");
                form.files.insert(name, spool);
            } else {
                let mut buf = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_err)? {
                    if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                        rejection = Some(Error::Validation(format!(
                            "{name} must be at most {MAX_TEXT_FIELD_BYTES} bytes"
                        )));
                        drain(&mut field).await?;
                        break;
                    }
                    buf.extend_from_slice(&chunk);
                }
                if rejection.is_some() {
                    continue;
                }
                match String::from_utf8(buf) {
                    Ok(text) => {
                        form.fields.entry(name).or_insert(text);
                    }
                    Err(_) => rejection = Some(Error::Validation(format!("{name} must be valid UTF-8"))),
                }
            }
        }

        match rejection {
            Some(e) => Err(e),
            None => Ok(form),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A text field that must be present (it may still be empty).
    pub fn require_text(&self, name: &str) -> Result<&str> {
        self.text(name)
            .ok_or_else(|| Error::Validation(format!("{name} is required")))
    }

    /// A text field that must hold more than whitespace.
    pub fn require_nonempty_text(&self, name: &str) -> Result<&str> {
        match self.text(name) {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(Error::Validation(format!("{name} is required"))),
        }
    }

    /// An unsigned integer field.
    pub fn require_number(&self, name: &str) -> Result<u32> {
        self.require_text(name)?
            .trim()
            .parse()
            .map_err(|_| Error::Validation(format!("{name} must be a whole number")))
    }

    /// Take a file part. Empty parts count as absent.
    pub fn take_file(&mut self, name: &str) -> Option<Spool> {
        self.files.remove(name).filter(|s| !s.is_empty())
    }

    pub fn require_file(&mut self, name: &str) -> Result<Spool> {
        self.take_file(name)
            .ok_or_else(|| Error::Validation(format!("{name} file is required")))
    }
}

async fn drain(field: &mut Field<'_>) -> Result<()> {
    while field.chunk().await.map_err(multipart_err)?.is_some() {}
    Ok(())
}

fn multipart_err(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::PayloadTooLarge("upload is too large".into());
    }
    Error::Validation(format!("invalid multipart body: {}", e.body_text()))
}

// ---------------------------------------------------------------------------
// Stored assets
// ---------------------------------------------------------------------------

/// A video that passed validation and was written to blob storage.
#[derive(Debug, Clone)]
pub struct StoredVideo {
    pub blob: StoredBlob,
    /// MIME type detected from the file contents.
    pub mime: &'static str,
    /// Whole seconds, `None` when the probe could not tell.
    pub duration: Option<u32>,
}

/// Blobs written for one request.
#[derive(Debug, Default)]
pub struct StoredAssets {
    pub video: Option<StoredVideo>,
    pub thumbnail: Option<StoredBlob>,
}

impl StoredAssets {
    /// Remove every blob in this set. Failures are only logged.
    pub async fn discard(&self, blobs: &BlobStore) {
        if let Some(video) = &self.video {
            blobs.discard(&video.blob).await;
        }
        if let Some(thumb) = &self.thumbnail {
            blobs.discard(thumb).await;
        }
    }

    /// Pass `outcome` through, discarding the blobs if it is an error.
    pub async fn keep_if_ok<T>(&self, blobs: &BlobStore, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            tracing::debug!(error = %e, "Discarding unreferenced upload blobs");
            self.discard(blobs).await;
        }
        outcome
    }
}

/// Validate, store and probe the uploaded files.
///
/// Both files are sniffed before either is stored.
pub async fn store_assets(
    ctx: &AppContext,
    video: Option<&Spool>,
    thumbnail: Option<&Spool>,
) -> Result<StoredAssets> {
    let video_mime = video
        .map(|s| AssetKind::Video.validate(s.prefix()))
        .transpose()?;
    let thumb_mime = thumbnail
        .map(|s| AssetKind::Image.validate(s.prefix()))
        .transpose()?;

    let mut assets = StoredAssets::default();

    if let (Some(spool), Some(mime)) = (video, video_mime) {
        let blob = ctx
            .blobs
            .store_file(spool.path(), BlobFolder::Videos, extension_for(mime))
            .await?;
        assets.video = Some(StoredVideo {
            blob,
            mime,
            duration: None,
        });
    }

    if let (Some(spool), Some(mime)) = (thumbnail, thumb_mime) {
        let stored = ctx
            .blobs
            .store_file(spool.path(), BlobFolder::Thumbs, extension_for(mime))
            .await;
        assets.thumbnail = Some(assets.keep_if_ok(&ctx.blobs, stored).await?);
    }

    if let Some(video) = assets.video.as_mut() {
        video.duration = probe_duration(ctx, &video.blob).await;
    }

    Ok(assets)
}

/// Ask the probe for a duration; any failure means "unknown".
async fn probe_duration(ctx: &AppContext, blob: &StoredBlob) -> Option<u32> {
    match ctx.probe.probe_duration(&blob.path).await {
        Ok(0) => {
            tracing::warn!(locator = %blob.locator, probe = ctx.probe.name(), "Duration unavailable");
            None
        }
        Ok(secs) => Some(secs),
        Err(e) => {
            tracing::warn!(
                locator = %blob.locator,
                probe = ctx.probe.name(),
                error = %e,
                "Duration probe failed; storing unknown duration"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate builders
// ---------------------------------------------------------------------------

fn video_entity(video: &StoredVideo) -> Result<Video> {
    Ok(Video::new(
        video.blob.locator.clone(),
        video.blob.size_kb(),
        video.duration,
        video.mime,
    )?)
}

fn thumbnail_entity(thumbnail: Option<&StoredBlob>) -> Result<Option<Thumbnail>> {
    Ok(thumbnail
        .map(|t| Thumbnail::new(t.locator.clone()))
        .transpose()?)
}

/// Assemble a movie content from stored assets.
pub fn build_movie(
    title: &str,
    description: &str,
    video: &StoredVideo,
    thumbnail: Option<&StoredBlob>,
) -> Result<Content> {
    let mut movie = Movie::new(video_entity(video)?);
    if let Some(thumb) = thumbnail_entity(thumbnail)? {
        movie.add_thumbnail(thumb);
    }
    Ok(Content::new(title, description, ContentType::Movie, movie)?)
}

/// Assemble an empty tv show content.
pub fn build_tv_show(
    title: &str,
    description: &str,
    thumbnail: Option<&StoredBlob>,
) -> Result<Content> {
    let mut show = TvShow::new();
    if let Some(thumb) = thumbnail_entity(thumbnail)? {
        show.add_thumbnail(thumb);
    }
    Ok(Content::new(title, description, ContentType::TvShow, show)?)
}

/// Assemble an episode from stored assets.
pub fn build_episode(
    title: &str,
    description: &str,
    season: u32,
    number: u32,
    video: &StoredVideo,
    thumbnail: Option<&StoredBlob>,
) -> Result<Episode> {
    let mut episode = Episode::new(title, description, season, number, video_entity(video)?)?;
    if let Some(thumb) = thumbnail_entity(thumbnail)? {
        episode.add_thumbnail(thumb);
    }
    Ok(episode)
}
