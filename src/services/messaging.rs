//! Messaging transport interface used for alerts and remote commands.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport rejected request: {0}")]
    Rejected(String),
    #[error("malformed transport response: {0}")]
    Decode(String),
}

/// One inbound message as seen by the command channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Externally assigned, monotonically increasing identifier
    pub id: i64,
    pub sender_id: String,
    pub text: String,
}

impl InboundMessage {
    pub fn new(id: i64, sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            sender_id: sender_id.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Send a text message, optionally carrying a link
    async fn send_message(
        &self,
        recipient: &str,
        text: &str,
        link: Option<&str>,
    ) -> Result<(), TransportError>;

    /// Long-poll for messages with an id strictly greater than `after_id`
    async fn get_updates(
        &self,
        after_id: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundMessage>, TransportError>;
}
