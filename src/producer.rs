//! Connect, publish one message, flush, exit.

use tracing::info;

use crate::broker::{BrokerError, BrokerMessage, NatsHandle};
use crate::config::Config;

/// Publishes `config.payload` to `config.broker.subject` once.
///
/// Nothing is published if the connection cannot be established. Returns once
/// the message has been flushed to the server; there is no acknowledgment from
/// subscribers. The connection is closed when the handle is dropped on return.
pub async fn run(config: &Config) -> Result<(), BrokerError> {
    let message = BrokerMessage::new(config.broker.subject.clone(), config.payload.clone())?;

    let mut handle = NatsHandle::open(config.broker.clone()).await?;
    handle.publish(message).await?;
    handle.flush().await?;

    info!("Message sent");
    Ok(())
}
