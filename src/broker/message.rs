use bytes::Bytes;
use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::fmt;

use super::error::BrokerError;

/// Number of payload characters shown by the `Display` impl.
const PREVIEW_CHARS: usize = 32;

/// A message on its way to, or fresh from, the broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerMessage {
    subject: String,
    payload: Bytes,
    timestamp: NaiveDateTime,
}

impl fmt::Display for BrokerMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.payload_str();
        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
        if text.chars().count() > PREVIEW_CHARS {
            write!(f, "{} - {}...", self.timestamp, preview)
        } else {
            write!(f, "{} - {}", self.timestamp, preview)
        }
    }
}

impl BrokerMessage {
    /// Builds an outgoing message. The payload must not be empty.
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Result<Self, BrokerError> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(BrokerError::EmptyPayload);
        }
        Ok(Self {
            subject: subject.into(),
            payload,
            timestamp: chrono::Local::now().naive_local(),
        })
    }

    /// Wraps a delivered message, stamping it with the time of receipt.
    pub fn from_delivery(message: async_nats::Message) -> Self {
        Self {
            subject: message.subject.to_string(),
            payload: message.payload,
            timestamp: chrono::Local::now().naive_local(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload decoded as UTF-8, invalid sequences replaced.
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn render(&self) -> String {
        format!("{}: {}\n{}", self.timestamp, self.subject, self.payload_str())
    }
}

/// Checks that `subject` is a literal subject a message can be published to.
pub fn validate_publish_subject(subject: &str) -> Result<(), BrokerError> {
    check_subject(subject, false)
}

/// Checks that `subject` can be subscribed to. `*` and a trailing `>` are
/// accepted as whole tokens.
pub fn validate_subscribe_subject(subject: &str) -> Result<(), BrokerError> {
    check_subject(subject, true)
}

fn check_subject(subject: &str, wildcards: bool) -> Result<(), BrokerError> {
    let invalid = |reason: &str| BrokerError::InvalidSubject {
        subject: subject.to_string(),
        reason: reason.to_string(),
    };

    if subject.is_empty() {
        return Err(invalid("subject is empty"));
    }
    if subject.chars().any(char::is_whitespace) {
        return Err(invalid("subject contains whitespace"));
    }

    let tokens: Vec<&str> = subject.split('.').collect();
    let last = tokens.len() - 1;
    for (idx, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            return Err(invalid("subject contains an empty token"));
        }
        match *token {
            "*" if wildcards => {}
            ">" if wildcards && idx == last => {}
            ">" if wildcards => return Err(invalid("'>' is only allowed as the last token")),
            t if t.contains('*') || t.contains('>') => {
                if wildcards {
                    return Err(invalid("wildcards must occupy a whole token"));
                }
                return Err(invalid("wildcards cannot be published to"));
            }
            _ => {}
        }
    }
    Ok(())
}
