//! Configuration loader for Haven.
//!
//! Reads `config.toml` from the data directory (`~/.haven/` in
//! production) and deserializes it into [`HavenConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use haven_types::config::HavenConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`HavenConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns defaults.
pub async fn load_config(data_dir: &Path) -> HavenConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return HavenConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return HavenConfig::default();
        }
    };

    match toml::from_str::<HavenConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            HavenConfig::default()
        }
    }
}

/// Resolve the data directory: `HAVEN_DATA_DIR` if set, otherwise
/// `~/.haven`, otherwise `./.haven` when no home directory exists.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HAVEN_DATA_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".haven"),
        None => PathBuf::from(".haven"),
    }
}
