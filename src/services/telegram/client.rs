use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::messages::{ApiResponse, InlineKeyboardMarkup, SendMessageRequest, Update};
use crate::services::messaging::{InboundMessage, MessagingTransport, TransportError};

/// Extra time allowed on top of the long-poll timeout before the HTTP call is abandoned
const REQUEST_GRACE: Duration = Duration::from_secs(10);

pub struct TelegramTransport {
    api_url: String,
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(api_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self::with_client(api_url, bot_token, reqwest::Client::new())
    }

    pub fn with_client(
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            client,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.bot_token, method)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
        let body = response.text().await?;
        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))?;

        if !envelope.ok {
            return Err(TransportError::Rejected(
                envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        envelope
            .result
            .ok_or_else(|| TransportError::Decode("missing result".to_string()))
    }
}

#[async_trait]
impl MessagingTransport for TelegramTransport {
    async fn send_message(
        &self,
        recipient: &str,
        text: &str,
        link: Option<&str>,
    ) -> Result<(), TransportError> {
        let request = SendMessageRequest {
            chat_id: recipient,
            text,
            reply_markup: link.map(|url| InlineKeyboardMarkup::single_link("Open chart", url)),
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .timeout(REQUEST_GRACE)
            .send()
            .await?;

        Self::decode::<serde_json::Value>(response).await?;
        debug!(recipient = %recipient, "TelegramTransport: message sent");
        Ok(())
    }

    async fn get_updates(
        &self,
        after_id: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundMessage>, TransportError> {
        let offset = after_id.saturating_add(1).to_string();
        let timeout_secs = timeout.as_secs().to_string();

        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset.as_str()), ("timeout", timeout_secs.as_str())])
            .timeout(timeout + REQUEST_GRACE)
            .send()
            .await?;

        let updates: Vec<Update> = Self::decode(response).await?;

        Ok(updates
            .into_iter()
            .map(|update| match update.message {
                Some(message) => InboundMessage::new(
                    update.update_id,
                    message.chat.id.to_string(),
                    message.text.unwrap_or_default(),
                ),
                None => InboundMessage::new(update.update_id, String::new(), String::new()),
            })
            .collect())
    }
}
