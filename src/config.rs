//! Process configuration: defaults, optional TOML file, environment overrides.

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::broker::message::validate_publish_subject;
use crate::broker::BrokerConfig;

pub const DEFAULT_PAYLOAD: &str = "Hello, NATS!";

/// Points at a config file to use instead of the per-user one.
pub const CONFIG_PATH_ENV: &str = "NATS_UPDATES_CONFIG";
/// Overrides the server URL, same variable the NATS CLI reads.
pub const URL_ENV: &str = "NATS_URL";

const CONFIG_DIR: &str = "nats-updates";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Body the producer publishes
    pub payload: String,
    pub broker: BrokerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            payload: DEFAULT_PAYLOAD.to_string(),
            broker: BrokerConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration the way both binaries do on startup.
    pub async fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);
        let url = std::env::var(URL_ENV).ok().filter(|u| !u.trim().is_empty());
        Self::load_from(path.as_deref(), url).await
    }

    /// Defaults, then `path` if it exists, then `url_override`.
    pub async fn load_from(path: Option<&Path>, url_override: Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path).await?.unwrap_or_default(),
            None => Self::default(),
        };

        if let Some(url) = url_override {
            debug!("Server URL overridden by {}: {}", URL_ENV, url);
            config.broker.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Option<Self>> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let config = toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;
        info!("Loaded configuration from {}", path.display());
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<()> {
        if self.payload.is_empty() {
            return Err(eyre!("payload must not be empty"));
        }
        if self.broker.url.trim().is_empty() {
            return Err(eyre!("broker.url must not be empty"));
        }
        if self.broker.connect_timeout_secs == 0 || self.broker.flush_timeout_secs == 0 {
            return Err(eyre!("broker timeouts must be at least one second"));
        }
        validate_publish_subject(&self.broker.subject)?;
        Ok(())
    }
}

/// `<config dir>/nats-updates/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = Config::load_from(Some(&path), None).await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.payload, "Hello, NATS!");
        assert_eq!(config.broker.subject, "updates");
    }

    #[tokio::test]
    async fn file_values_override_defaults() {
        let file = write_config(
            r#"
payload = "ping"

[broker]
url = "nats://broker.local:4222"
connect_timeout_secs = 2
"#,
        );

        let config = Config::load_from(Some(file.path()), None).await.unwrap();
        assert_eq!(config.payload, "ping");
        assert_eq!(config.broker.url, "nats://broker.local:4222");
        assert_eq!(config.broker.connect_timeout_secs, 2);
        assert_eq!(config.broker.subject, "updates");
    }

    #[tokio::test]
    async fn url_override_wins_over_file() {
        let file = write_config("[broker]\nurl = \"nats://from-file:4222\"\n");

        let config = Config::load_from(Some(file.path()), Some("nats://from-env:4222".into()))
            .await
            .unwrap();
        assert_eq!(config.broker.url, "nats://from-env:4222");
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let file = write_config("payload = [not toml");
        assert!(Config::load_from(Some(file.path()), None).await.is_err());
    }

    #[tokio::test]
    async fn invalid_values_are_rejected() {
        let empty_payload = write_config("payload = \"\"");
        assert!(Config::load_from(Some(empty_payload.path()), None)
            .await
            .is_err());

        let wildcard = write_config("[broker]\nsubject = \"updates.*\"\n");
        assert!(Config::load_from(Some(wildcard.path()), None).await.is_err());

        let zero_timeout = write_config("[broker]\nflush_timeout_secs = 0\n");
        assert!(Config::load_from(Some(zero_timeout.path()), None)
            .await
            .is_err());
    }

    #[tokio::test]
    #[serial]
    async fn load_reads_environment() {
        let file = write_config("payload = \"from env path\"");
        std::env::set_var(CONFIG_PATH_ENV, file.path());
        std::env::set_var(URL_ENV, "nats://env-host:4222");

        let config = Config::load().await;

        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(URL_ENV);

        let config = config.unwrap();
        assert_eq!(config.payload, "from env path");
        assert_eq!(config.broker.url, "nats://env-host:4222");
    }
}
