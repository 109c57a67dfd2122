use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::types::{ApiResponse, GetUpdatesRequest, Message, SendMessageRequest, Update, User};
use super::TransportError;

pub const BASE_URL: &str = "https://api.telegram.org";

/// Extra time allowed on top of the long-poll timeout before the HTTP request is abandoned.
const LONG_POLL_GRACE: Duration = Duration::from_secs(10);

/// HTTP client for the Telegram Bot API.
///
/// Every method is a JSON POST to `{base_url}/bot{token}/{method}`. The token
/// is part of the URL, so URLs are stripped from every surfaced error.
pub struct TelegramClient {
    token: String,
    http_client: Client,
    base_url: String,
}

impl TelegramClient {
    /// Create a client using the public Bot API endpoint.
    pub fn new(token: String, request_timeout: Duration) -> Result<Self, TransportError> {
        Self::with_base_url(token, BASE_URL.to_string(), request_timeout)
    }

    /// Create a client with a custom base URL (for testing with a mock server).
    pub fn with_base_url(
        token: String,
        base_url: String,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .user_agent("weatherbot/0.1")
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            token,
            http_client,
            base_url,
        })
    }

    /// Identity of the bot owning the token. Used at startup to verify the token.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for message updates starting at `offset`.
    ///
    /// Blocks up to `timeout_secs` on the server side when there is nothing new.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let timeout = Duration::from_secs(timeout_secs) + LONG_POLL_GRACE;
        self.call("getUpdates", &body, Some(timeout)).await
    }

    /// Send a plain text message to `chat_id`.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TransportError> {
        let body = SendMessageRequest { chat_id, text };
        self.call("sendMessage", &body, None).await
    }

    async fn call<B, T>(
        &self,
        method: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = method, "Calling Telegram Bot API");

        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let mut request = self.http_client.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        // Error responses carry the same envelope with ok=false
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                TransportError::Decode(e.to_string())
            } else {
                TransportError::Api {
                    code: Some(status.as_u16() as i64),
                    description: format!("HTTP {}", status),
                }
            }
        })?;

        if !envelope.ok {
            return Err(TransportError::Api {
                code: envelope.error_code,
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope
            .result
            .ok_or_else(|| TransportError::Decode(format!("{} response has no result", method)))
    }
}
