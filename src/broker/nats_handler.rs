use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::BrokerConfig;
use super::error::BrokerError;
use super::message::{validate_publish_subject, validate_subscribe_subject, BrokerMessage};

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Subscribed,
    Failed,
}

#[derive(Clone, Debug, Default)]
pub struct BrokerStatus {
    pub connection_state: ConnectionState,
    pub error_messages: Vec<String>,
    pub messages_sent: usize,
    pub last_activity: Option<chrono::DateTime<chrono::Local>>,
}

impl BrokerStatus {
    fn touch(&mut self) {
        self.last_activity = Some(chrono::Local::now());
    }

    fn fail(&mut self, err: &BrokerError) {
        self.connection_state = ConnectionState::Failed;
        self.error_messages.push(err.to_string());
        self.touch();
    }
}

/// Connection to the broker and its bookkeeping.
///
/// Built in [`ConnectionState::Disconnected`]; [`NatsHandle::connect`] moves it
/// to `Connected`, or to `Failed` if the server cannot be reached. Dropping the
/// handle closes the connection once the last clone of the underlying client
/// (including those held by subscriptions) is gone.
pub struct NatsHandle {
    status: BrokerStatus,
    client: Option<async_nats::Client>,
    config: BrokerConfig,
}

impl NatsHandle {
    pub fn new(config: BrokerConfig) -> Self {
        NatsHandle {
            status: BrokerStatus::default(),
            client: None,
            config,
        }
    }

    /// Opens the connection. There is no retry: a server that cannot be
    /// reached on the first attempt is reported as [`BrokerError::Connect`]
    /// and leaves the handle `Failed`.
    pub async fn connect(&mut self) -> Result<(), BrokerError> {
        self.status.connection_state = ConnectionState::Connecting;
        debug!(
            "Connecting to {} as '{}'",
            self.config.url, self.config.client_name
        );

        let connected = async_nats::ConnectOptions::new()
            .name(self.config.client_name.clone())
            .connection_timeout(self.config.connect_timeout())
            .connect(self.config.url.as_str())
            .await;

        match connected {
            Ok(client) => {
                self.client = Some(client);
                self.status.connection_state = ConnectionState::Connected;
                self.status.touch();
                info!("Connected to {}", self.config.url);
                Ok(())
            }
            Err(source) => {
                let err = BrokerError::Connect {
                    url: self.config.url.clone(),
                    source,
                };
                self.status.fail(&err);
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Builds a handle and connects it in one step.
    pub async fn open(config: BrokerConfig) -> Result<Self, BrokerError> {
        let mut handle = Self::new(config);
        handle.connect().await?;
        Ok(handle)
    }

    pub fn status(&self) -> &BrokerStatus {
        &self.status
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    fn client(&self) -> Result<async_nats::Client, BrokerError> {
        self.client.clone().ok_or(BrokerError::NotConnected)
    }

    /// Hands the message to the client's write buffer. Returns without
    /// waiting for the bytes to reach the server; see [`NatsHandle::flush`].
    pub async fn publish(&mut self, message: BrokerMessage) -> Result<(), BrokerError> {
        validate_publish_subject(message.subject())?;
        let client = self.client()?;

        let subject = message.subject().to_string();
        if let Err(source) = client
            .publish(subject.clone(), message.payload().clone())
            .await
        {
            let err = BrokerError::Publish { subject, source };
            self.status.fail(&err);
            return Err(err);
        }

        self.status.messages_sent += 1;
        self.status.touch();
        debug!("Published {}", message);
        Ok(())
    }

    /// Waits until everything published so far has been written to the
    /// server, bounded by the configured flush timeout.
    pub async fn flush(&mut self) -> Result<(), BrokerError> {
        let client = self.client()?;
        let timeout = self.config.flush_timeout();
        let outcome = tokio::time::timeout(timeout, client.flush()).await.ok();
        let result = flush_result(outcome, timeout);
        if let Err(err) = &result {
            self.status.fail(err);
        }
        result
    }

    /// Registers `callback` for every message arriving on `subject`.
    ///
    /// Delivery runs on its own task; the callback is invoked once per
    /// message, in arrival order, until the subscription ends.
    pub async fn subscribe<F>(
        &mut self,
        subject: &str,
        mut callback: F,
    ) -> Result<SubscriptionHandle, BrokerError>
    where
        F: FnMut(BrokerMessage) + Send + 'static,
    {
        validate_subscribe_subject(subject)?;
        let client = self.client()?;

        let mut subscriber = match client.subscribe(subject.to_string()).await {
            Ok(subscriber) => subscriber,
            Err(source) => {
                let err = BrokerError::Subscribe {
                    subject: subject.to_string(),
                    source,
                };
                self.status.fail(&err);
                return Err(err);
            }
        };

        self.status.connection_state = ConnectionState::Subscribed;
        self.status.touch();
        info!("Subscribed to '{}'", subject);

        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = delivered.clone();
        let task_subject = subject.to_string();
        let task = tokio::spawn(async move {
            while let Some(message) = subscriber.next().await {
                counter.fetch_add(1, Ordering::Relaxed);
                callback(BrokerMessage::from_delivery(message));
            }
            warn!("Subscription to '{}' ended", task_subject);
        });

        Ok(SubscriptionHandle {
            subject: subject.to_string(),
            delivered,
            task,
        })
    }
}

/// Keeps a callback subscription alive and reports on it.
pub struct SubscriptionHandle {
    subject: String,
    delivered: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Messages handed to the callback so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    /// True once the server or client has closed the subscription.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Maps the outcome of a bounded flush; `None` means the timeout elapsed.
fn flush_result<E: std::fmt::Display>(
    outcome: Option<Result<(), E>>,
    timeout: Duration,
) -> Result<(), BrokerError> {
    match outcome {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(BrokerError::Flush(e.to_string())),
        None => Err(BrokerError::Flush(format!(
            "timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
