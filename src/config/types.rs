// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Downstream multipart upload endpoint
pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080/upload";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub forward: ForwardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            workers: None,
        }
    }
}

/// On-disk layout, every directory is relative to `root`
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub files_dir: String,
    pub images_dir: String,
    pub poem_dir: String,
    pub music_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            files_dir: "files".to_string(),
            images_dir: "images".to_string(),
            poem_dir: "poem".to_string(),
            music_dir: "music".to_string(),
        }
    }
}

impl PathsConfig {
    /// Directory holding the four files forwarded by `/send-files`
    pub fn files_path(&self) -> PathBuf {
        self.root.join(&self.files_dir)
    }

    pub fn resolve(&self, dir: &str) -> PathBuf {
        self.root.join(dir)
    }

    /// Application root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Outbound upload configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ForwardConfig {
    pub target_url: String,
    /// Whole-request timeout; unset means the call may block indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            timeout_secs: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_debug(&self) -> bool {
        self.level.eq_ignore_ascii_case("debug") || self.level.eq_ignore_ascii_case("trace")
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on a single connection's lifetime, unset for no limit
    pub connection_timeout_secs: Option<u64>,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            connection_timeout_secs: None,
            max_connections: None,
        }
    }
}
