//! Configuration Module
//!
//! This module defines all configuration structures for the grading service.
//! Configuration is loaded from TOML files and parsed using serde. Every
//! section and field has a default, so a partial file (or none at all in
//! tests) is enough.

use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "0.0.0.0"
/// port = 8000
///
/// [upload]
/// max_essays = 50
/// max_file_size = 10485760
/// allowed_extensions = ["jpg", "jpeg", "png", "bmp"]
///
/// [batch]
/// max_concurrent_gradings = 4
/// grading_timeout_ms = 120000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub batch: BatchConfig,
    pub retention: RetentionConfig,
    pub grader: GraderConfig,
    pub students: StudentsConfig,
    pub log: LogConfig,
}

/// HTTP adapter configuration
///
/// # Fields
/// - `host`: IP address to bind to
/// - `port`: TCP port to listen on
/// - `max_request_bytes`: body limit for multipart uploads
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_request_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_request_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Upload limits enforced by the session store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum number of essays a single session may hold
    pub max_essays: usize,
    /// Maximum size of any single uploaded file, in bytes
    pub max_file_size: usize,
    /// Accepted filename extensions (lower case, without the dot)
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_essays: 50,
            max_file_size: 10 * 1024 * 1024,
            allowed_extensions: ["jpg", "jpeg", "png", "bmp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Batch execution configuration
///
/// # Fields
/// - `max_concurrent_gradings`: essays graded in parallel within one task (1 = sequential)
/// - `grading_timeout_ms`: upper bound on one grading call before it counts as failed
/// - `email_timeout_ms`: upper bound on one notification
/// - `notify_on_failure`: whether a failed grading still sends the student a notice
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_concurrent_gradings: usize,
    pub grading_timeout_ms: u64,
    pub email_timeout_ms: u64,
    pub notify_on_failure: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_gradings: 4,
            grading_timeout_ms: 120_000,
            email_timeout_ms: 30_000,
            notify_on_failure: false,
        }
    }
}

impl BatchConfig {
    pub fn grading_timeout(&self) -> Duration {
        Duration::from_millis(self.grading_timeout_ms)
    }

    pub fn email_timeout(&self) -> Duration {
        Duration::from_millis(self.email_timeout_ms)
    }
}

/// Retention windows for the background sweeper
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Idle sessions older than this are dropped
    pub session_ttl_secs: u64,
    /// Terminal tasks are kept this long after finishing
    pub task_retention_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 2 * 60 * 60,
            task_retention_secs: 60 * 60,
            sweep_interval_secs: 60,
        }
    }
}

/// Grading backend endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000/grade".to_string(),
            api_key: None,
        }
    }
}

/// Student directory used to resolve names and email addresses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentsConfig {
    /// Path to a JSON object mapping student name to email; `None` disables lookup
    pub directory_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
