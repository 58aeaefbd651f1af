//! Magic-byte content type detection.
//!
//! [`sniff`] looks only at the leading bytes of a file (at most
//! [`SNIFF_LEN`]) and never at its name. [`AssetKind::validate`] then checks
//! the result against the allow-list for what the upload is meant to be.

use rh_core::{Error, Result};

/// Number of leading bytes considered when sniffing.
pub const SNIFF_LEN: usize = 512;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// A leading-byte signature.
enum Sig {
    /// The data starts with these bytes.
    Exact(&'static [u8]),
    /// `RIFF`, any 4-byte length, then this tag.
    Riff(&'static [u8]),
}

impl Sig {
    fn matches(&self, data: &[u8]) -> bool {
        match self {
            Sig::Exact(p) => data.starts_with(p),
            Sig::Riff(tag) => {
                data.len() >= 8 + tag.len() && data.starts_with(b"RIFF") && data[8..].starts_with(tag)
            }
        }
    }
}

/// Signatures checked in order.
const SIGNATURES: &[(Sig, &str)] = &[
    (Sig::Exact(b"%PDF-"), "application/pdf"),
    (Sig::Exact(b"%!PS-Adobe-"), "application/postscript"),
    (Sig::Exact(&[0xFE, 0xFF]), "text/plain; charset=utf-16be"),
    (Sig::Exact(&[0xFF, 0xFE]), "text/plain; charset=utf-16le"),
    (Sig::Exact(&[0xEF, 0xBB, 0xBF]), TEXT_PLAIN),
    (Sig::Exact(b"GIF87a"), "image/gif"),
    (Sig::Exact(b"GIF89a"), "image/gif"),
    (Sig::Exact(b"\x89PNG\x0D\x0A\x1A\x0A"), "image/png"),
    (Sig::Exact(&[0xFF, 0xD8, 0xFF]), "image/jpeg"),
    (Sig::Exact(b"BM"), "image/bmp"),
    (Sig::Riff(b"WEBPVP"), "image/webp"),
    (Sig::Exact(&[0x00, 0x00, 0x01, 0x00]), "image/x-icon"),
    (Sig::Riff(b"WAVE"), "audio/wave"),
    (Sig::Riff(b"AVI "), "video/avi"),
    (Sig::Exact(b"ID3"), "audio/mpeg"),
    (Sig::Exact(b"OggS\x00"), "application/ogg"),
    (Sig::Exact(&[0x1A, 0x45, 0xDF, 0xA3]), "video/webm"),
    (Sig::Exact(b"PK\x03\x04"), "application/zip"),
    (Sig::Exact(&[0x1F, 0x8B, 0x08]), "application/x-gzip"),
    (Sig::Exact(b"Rar!\x1A\x07\x00"), "application/x-rar-compressed"),
    (Sig::Exact(b"\x00asm"), "application/wasm"),
];

/// ISO base media file with an `ftyp` box naming an `mp4*` brand.
fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size % 4 != 0 || data.len() < box_size || &data[4..8] != b"ftyp" {
        return false;
    }
    // Major brand at 8, minor version at 12, compatible brands after.
    (8..box_size)
        .step_by(4)
        .filter(|&st| st != 12)
        .any(|st| data.get(st..st + 3) == Some(b"mp4"))
}

/// MPEG transport stream: sync byte at the start of two consecutive packets.
fn is_mpeg_ts(data: &[u8]) -> bool {
    const PACKET: usize = 188;
    data.len() > PACKET && data[0] == 0x47 && data[PACKET] == 0x47
}

const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Tag match is case-insensitive and must end at a space or `>`.
fn is_html(data: &[u8]) -> bool {
    HTML_TAGS.iter().any(|tag| {
        data.len() > tag.len()
            && data[..tag.len()].eq_ignore_ascii_case(tag)
            && matches!(data[tag.len()], b' ' | b'>')
    })
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Detect the MIME type of `prefix`. Only the first [`SNIFF_LEN`] bytes count.
///
/// Falls back to `text/plain; charset=utf-8` for data without binary control
/// bytes and to `application/octet-stream` otherwise.
pub fn sniff(prefix: &[u8]) -> &'static str {
    let data = &prefix[..prefix.len().min(SNIFF_LEN)];

    let trimmed = {
        let start = data
            .iter()
            .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
            .unwrap_or(data.len());
        &data[start..]
    };
    if is_html(trimmed) {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| sig.matches(data)) {
        return mime;
    }
    if is_mp4(data) {
        return "video/mp4";
    }
    if is_mpeg_ts(data) {
        return "video/mp2t";
    }

    if data.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

/// What an uploaded file is supposed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    /// MIME types accepted for this kind.
    pub fn allowed(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Video => &["video/mp4"],
            AssetKind::Image => &["image/jpeg", "image/png"],
        }
    }

    fn requirement(&self) -> &'static str {
        match self {
            AssetKind::Video => "the video must be an MP4 file",
            AssetKind::Image => "the thumbnail must be a JPEG or PNG image",
        }
    }

    /// Sniff `prefix` and confirm it is allowed for this kind.
    ///
    /// Returns the detected MIME type.
    pub fn validate(&self, prefix: &[u8]) -> Result<&'static str> {
        let mime = sniff(prefix);
        if self.allowed().contains(&mime) {
            Ok(mime)
        } else {
            tracing::debug!(kind = ?self, detected = mime, "Rejected upload content type");
            Err(Error::Validation(self.requirement().into()))
        }
    }
}

/// File extension used when storing a file of the given MIME type.
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "bin",
    }
}
