//! Configuration structures deserialized from `config.toml`.
//!
//! Every section and field has a default so a missing or partial file
//! still yields a runnable configuration. The loader lives in
//! `haven-infra::config`.

use serde::Deserialize;

/// Top-level Haven configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HavenConfig {
    pub server: ServerConfig,
    pub summarizer: SummarizerConfig,
    pub video: VideoConfig,
    pub archive: ArchiveConfig,
}

/// Bind address for the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// External summarizer (OpenAI-compatible chat-completions endpoint).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub model: String,
    /// Bearer token, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Bounded request timeout; a stalled summarizer is a provider failure.
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1234".to_string(),
            model: "kanana-nano-2.1b-instruct".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Video-conferencing provider (OpenVidu-compatible REST API).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub base_url: String,
    /// Provider shared secret for basic auth.
    pub secret: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4443".to_string(),
            secret: None,
            timeout_secs: 10,
        }
    }
}

/// Transcript archive destination.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Blob-store root. Defaults to `{data_dir}/archives` when unset.
    pub dir: Option<std::path::PathBuf>,
}
