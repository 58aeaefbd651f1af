//! Duration probing.
//!
//! [`DurationProbe`] is the only thing the upload path knows about media
//! inspection: give it a stored file, get back whole seconds. Failures are
//! ordinary errors; callers decide whether a missing duration matters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rh_core::config::ToolsConfig;
use rh_core::{Error, Result};

use crate::command::ToolCommand;

/// Determines the playing time of a media file.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Human-readable name identifying this probe implementation.
    fn name(&self) -> &'static str;

    /// Duration of the file at `path` in whole seconds.
    ///
    /// `Ok(0)` means the probe does not inspect files of this kind.
    async fn probe_duration(&self, path: &Path) -> Result<u32>;
}

/// Only MP4 files are handed to ffprobe.
fn is_mp4(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
}

/// Parse ffprobe's `format=duration` output (e.g. `"12.480000\n"`).
///
/// Fractional seconds are truncated.
pub fn parse_duration(stdout: &str) -> Result<u32> {
    let text = stdout.trim();
    let secs: f64 = text
        .parse()
        .map_err(|e| Error::Probe(format!("unparseable duration {text:?}: {e}")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::Probe(format!("invalid duration {text:?}")));
    }
    if secs >= f64::from(u32::MAX) {
        return Err(Error::Probe(format!("duration {text:?} is out of range")));
    }
    Ok(secs.trunc() as u32)
}

/// A [`DurationProbe`] backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeDurationProbe {
    /// Create a probe using the given ffprobe binary.
    pub fn new(ffprobe_path: PathBuf, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }

    /// Locate ffprobe from config, falling back to `PATH`.
    ///
    /// A configured path that does not exist falls back to `PATH` as well.
    pub fn discover(tools: &ToolsConfig) -> Option<Self> {
        let resolved = match tools.ffprobe_path.as_deref() {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            _ => which::which("ffprobe").ok(),
        };
        resolved.map(|p| Self::new(p, Duration::from_secs(tools.probe_timeout_secs)))
    }

    pub fn path(&self) -> &Path {
        &self.ffprobe_path
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe_duration(&self, path: &Path) -> Result<u32> {
        if !is_mp4(path) {
            tracing::debug!(path = %path.display(), "Not an mp4; skipping duration probe");
            return Ok(0);
        }

        let output = ToolCommand::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path.to_string_lossy())
            .timeout(self.timeout)
            .execute()
            .await?;

        let secs = parse_duration(&output.stdout)?;
        tracing::debug!(path = %path.display(), duration_secs = secs, "Probed duration");
        Ok(secs)
    }
}

/// Stand-in used when no ffprobe binary could be found.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProbe;

#[async_trait]
impl DurationProbe for UnavailableProbe {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn probe_duration(&self, _path: &Path) -> Result<u32> {
        Err(Error::tool("ffprobe", "not installed"))
    }
}
