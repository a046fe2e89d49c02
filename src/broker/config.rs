use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Address the NATS client tools fall back to when nothing else is configured.
pub const DEFAULT_URL: &str = "nats://127.0.0.1:4222";
pub const DEFAULT_SUBJECT: &str = "updates";
pub const DEFAULT_CLIENT_NAME: &str = "nats-updates";

/// Connection settings shared by producer and consumer.
///
/// Every field has a default so a partial `[broker]` table in the config file
/// only overrides what it names.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct BrokerConfig {
    /// Server URL, e.g. `nats://127.0.0.1:4222`
    pub url: String,
    /// Subject both processes agree on
    pub subject: String,
    /// Name announced to the server in the CONNECT handshake
    pub client_name: String,
    pub connect_timeout_secs: u64,
    pub flush_timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            connect_timeout_secs: 5,
            flush_timeout_secs: 5,
        }
    }
}

impl BrokerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_secs(self.flush_timeout_secs)
    }

    /// Same settings pointed at another server.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let config = BrokerConfig::default();
        assert_eq!(config.url, "nats://127.0.0.1:4222");
        assert_eq!(config.subject, "updates");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let config: BrokerConfig = toml::from_str("url = \"nats://broker:4222\"").unwrap();
        assert_eq!(config.url, "nats://broker:4222");
        assert_eq!(config.subject, DEFAULT_SUBJECT);
        assert_eq!(config.flush_timeout_secs, 5);
    }
}
