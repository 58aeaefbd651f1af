//! Byte-range resolution and chunked file serving.
//!
//! [`resolve_range`] is a pure function from the `Range` header and the file
//! length to a [`RangePlan`]; [`serve_file`] turns an open file plus a plan
//! into a response whose body streams the window in 64 KiB chunks.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Read size used when streaming file bodies.
pub const STREAM_CHUNK: usize = 64 * 1024;

/// How a request for a file of known length should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePlan {
    /// 200 with the whole file.
    Full { len: u64 },
    /// 206 with bytes `start..=end` of `total`.
    Partial { start: u64, end: u64, total: u64 },
    /// 416 with `Content-Range: bytes */total`.
    Unsatisfiable { total: u64 },
}

impl RangePlan {
    pub fn status(&self) -> StatusCode {
        match self {
            RangePlan::Full { .. } => StatusCode::OK,
            RangePlan::Partial { .. } => StatusCode::PARTIAL_CONTENT,
            RangePlan::Unsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    /// Number of body bytes.
    pub fn body_len(&self) -> u64 {
        match *self {
            RangePlan::Full { len } => len,
            RangePlan::Partial { start, end, .. } => end - start + 1,
            RangePlan::Unsatisfiable { .. } => 0,
        }
    }
}

/// Resolve a `Range` header against a file of `total` bytes.
///
/// Headers that cannot be parsed as a byte range are ignored and the whole
/// file is served. Only the first range of a multi-range request is used.
pub fn resolve_range(header: Option<&str>, total: u64) -> RangePlan {
    let full = RangePlan::Full { len: total };
    let unsatisfiable = RangePlan::Unsatisfiable { total };

    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return full;
    };
    let first = spec.split(',').next().unwrap_or("").trim();
    let Some((start_str, end_str)) = first.split_once('-') else {
        return full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix form: the last `k` bytes.
    if start_str.is_empty() {
        let Ok(k) = end_str.parse::<u64>() else {
            return full;
        };
        if k == 0 || total == 0 {
            return unsatisfiable;
        }
        return RangePlan::Partial {
            start: total.saturating_sub(k),
            end: total - 1,
            total,
        };
    }

    let Ok(start) = start_str.parse::<u64>() else {
        return full;
    };
    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<u64>() {
            Ok(e) => Some(e),
            Err(_) => return full,
        }
    };

    if total == 0 {
        return unsatisfiable;
    }
    let last = total - 1;
    let end = end.map_or(last, |e| e.min(last));
    if start > last || start > end {
        return unsatisfiable;
    }
    RangePlan::Partial { start, end, total }
}

/// Guess the MIME type from a file name's extension.
pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "ts" => "video/mp2t",
        "mov" => "video/quicktime",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Serve an open file according to the request's `Range` header.
///
/// The length comes from the open handle, so the plan and the bytes sent
/// describe the same file. The body stream owns the handle.
pub async fn serve_file(
    mut file: tokio::fs::File,
    content_type: &str,
    range_header: Option<&str>,
) -> rh_core::Result<Response> {
    let total = file.metadata().await?.len();
    let plan = resolve_range(range_header, total);

    let response = match plan {
        RangePlan::Unsatisfiable { total } => (
            plan.status(),
            [
                (header::CONTENT_RANGE, format!("bytes */{total}")),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            Body::empty(),
        )
            .into_response(),
        RangePlan::Full { len } => {
            let stream = ReaderStream::with_capacity(file.take(len), STREAM_CHUNK);
            (
                plan.status(),
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_LENGTH, len.to_string()),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        RangePlan::Partial { start, end, total } => {
            file.seek(std::io::SeekFrom::Start(start)).await?;
            let length = plan.body_len();
            let stream = ReaderStream::with_capacity(file.take(length), STREAM_CHUNK);
            (
                plan.status(),
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_LENGTH, length.to_string()),
                    (header::CONTENT_RANGE, format!("bytes {start}-{end}/{total}")),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
    };

    Ok(response)
}
