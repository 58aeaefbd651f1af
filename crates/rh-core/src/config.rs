//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, storage and tool sections. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, the file does not exist, or it fails to parse.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.max_upload_bytes < MIN_UPLOAD_BYTES {
            warnings.push(format!(
                "server.max_upload_bytes ({}) is below {MIN_UPLOAD_BYTES}; most videos will be rejected",
                self.server.max_upload_bytes
            ));
        }

        if self.tools.probe_timeout_secs == 0 {
            warnings.push("tools.probe_timeout_secs is 0; every probe will time out".into());
        }

        if let Some(ref p) = self.tools.ffprobe_path {
            if !p.exists() {
                warnings.push(format!(
                    "tools.ffprobe_path {} does not exist; durations will be unknown",
                    p.display()
                ));
            }
        }

        warnings
    }
}

/// Uploads smaller than this limit are almost certainly a misconfiguration.
const MIN_UPLOAD_BYTES: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Upper bound on a whole multipart request body.
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("./data/reelhouse.db"),
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory that contains the `upload/` tree.
    pub root: PathBuf,
}

impl StorageConfig {
    /// Where in-flight uploads are spooled before they are accepted.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(".staging")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Explicit ffprobe binary; discovered on `PATH` when unset.
    pub ffprobe_path: Option<PathBuf>,
    pub probe_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffprobe_path: None,
            probe_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.root, PathBuf::from("."));
        assert_eq!(cfg.tools.probe_timeout_secs, 30);
        assert!(cfg.tools.ffprobe_path.is_none());
    }

    #[test]
    fn staging_dir_is_under_root() {
        let storage = StorageConfig {
            root: PathBuf::from("/srv/media"),
        };
        assert_eq!(storage.staging_dir(), PathBuf::from("/srv/media/.staging"));
    }

    #[test]
    fn default_config_no_warnings() {
        let warnings = Config::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn zero_timeout_warns() {
        let mut cfg = Config::default();
        cfg.tools.probe_timeout_secs = 0;
        assert!(cfg.validate().iter().any(|w| w.contains("probe_timeout_secs")));
    }

    #[test]
    fn missing_ffprobe_path_warns() {
        let mut cfg = Config::default();
        cfg.tools.ffprobe_path = Some(PathBuf::from("/nonexistent/ffprobe"));
        assert!(cfg.validate().iter().any(|w| w.contains("ffprobe_path")));
    }

    #[test]
    fn tiny_upload_limit_warns() {
        let mut cfg = Config::default();
        cfg.server.max_upload_bytes = 10;
        assert!(cfg.validate().iter().any(|w| w.contains("max_upload_bytes")));
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"server": {"port": 9090}, "storage": {"root": "/srv/media"}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.root, PathBuf::from("/srv/media"));
    }

    #[test]
    fn parse_invalid_json_is_validation_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn load_or_default_with_none() {
        assert_eq!(Config::load_or_default(None).server.port, 8080);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/config.json")));
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tools": {"probe_timeout_secs": 5}}"#).unwrap();
        let cfg = Config::load_or_default(Some(&path));
        assert_eq!(cfg.tools.probe_timeout_secs, 5);
    }
}
