//! # NATS Broker Integration
//!
//! Everything the producer and consumer need to talk to a NATS server: connection
//! settings, the message type that travels over the wire, and a thin connection
//! handle wrapping `async-nats`.
//!
//! ```text
//! broker/
//! ├── config.rs        - Connection settings and defaults
//! ├── error.rs         - BrokerError
//! ├── message.rs       - BrokerMessage and subject validation
//! └── nats_handler.rs  - Connection handle, publish, callback subscriptions
//! ```
//!
//! The handle does no reconnect bookkeeping of its own and never retries. A failed
//! connect, publish or subscribe surfaces as a [`BrokerError`] and the caller
//! decides what to do with it; both binaries treat it as fatal.

pub mod config;
pub mod error;
pub mod message;
pub mod nats_handler;

pub use config::BrokerConfig;
pub use error::BrokerError;
pub use message::BrokerMessage;
pub use nats_handler::{BrokerStatus, ConnectionState, NatsHandle, SubscriptionHandle};
