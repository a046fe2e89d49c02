//! Connect, subscribe with a logging callback, then wait forever.

use tracing::info;

use crate::broker::{BrokerError, BrokerMessage, BrokerStatus, NatsHandle, SubscriptionHandle};
use crate::config::Config;

/// A live consumer: the connection plus its one subscription.
pub struct ConsumerHandle {
    handle: NatsHandle,
    subscription: SubscriptionHandle,
}

impl ConsumerHandle {
    pub fn status(&self) -> &BrokerStatus {
        self.handle.status()
    }

    pub fn subscription(&self) -> &SubscriptionHandle {
        &self.subscription
    }
}

/// Connects and registers `callback` on `config.broker.subject`.
///
/// If the connection fails no subscription is attempted.
pub async fn start<F>(config: &Config, callback: F) -> Result<ConsumerHandle, BrokerError>
where
    F: FnMut(BrokerMessage) + Send + 'static,
{
    let mut handle = NatsHandle::open(config.broker.clone()).await?;
    let subscription = handle.subscribe(&config.broker.subject, callback).await?;
    Ok(ConsumerHandle {
        handle,
        subscription,
    })
}

/// Callback used by [`run`]: logs the payload of each delivered message.
pub fn log_message(message: BrokerMessage) {
    info!("Received message: {}", message.payload_str());
}

/// Starts a consumer that logs every payload and never returns on success.
pub async fn run(config: &Config) -> Result<(), BrokerError> {
    let _consumer = start(config, log_message).await?;
    std::future::pending::<()>().await;
    Ok(())
}
