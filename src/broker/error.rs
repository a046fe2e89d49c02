//! Error definitions for the broker module

use thiserror::Error;

/// Errors raised while talking to the NATS broker
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The initial connection to the broker could not be established
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: async_nats::ConnectError,
    },

    /// The client rejected a publish
    #[error("Failed to publish to '{subject}': {source}")]
    Publish {
        subject: String,
        #[source]
        source: async_nats::PublishError,
    },

    /// Pending writes could not be flushed to the broker in time
    #[error("Failed to flush connection: {0}")]
    Flush(String),

    /// The subscription could not be registered
    #[error("Failed to subscribe to '{subject}': {source}")]
    Subscribe {
        subject: String,
        #[source]
        source: async_nats::SubscribeError,
    },

    /// Subject is not a valid NATS subject
    #[error("Invalid subject '{subject}': {reason}")]
    InvalidSubject { subject: String, reason: String },

    /// The handle has no open connection
    #[error("Not connected to a broker")]
    NotConnected,

    /// Messages must carry at least one byte
    #[error("Message payload must not be empty")]
    EmptyPayload,
}
