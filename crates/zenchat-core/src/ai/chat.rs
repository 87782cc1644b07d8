use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ChatError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Shown in place of a reply when the endpoint can't be reached
pub const FALLBACK_REPLY: &str = "ZenAI is confused... Try again!";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: Url,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ChatError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ChatError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Send one message and return the endpoint's reply text
    pub async fn send(&self, message: &str) -> Result<String> {
        debug!(endpoint = %self.endpoint, chars = message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "chat endpoint rejected request");
            return Err(ChatError::Status { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;
        debug!(chars = chat_response.reply.chars().count(), "received chat reply");
        Ok(chat_response.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(matches!(
            ChatClient::new("not a url"),
            Err(ChatError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            ChatClient::new("ftp://localhost/chat"),
            Err(ChatError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_accepts_default_endpoint() {
        let client = ChatClient::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_send_returns_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_body(Matcher::Json(json!({ "message": "hello" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"reply":"Hi there!\n```py\nprint(1)\n```"}"#)
            .create_async()
            .await;

        let client = ChatClient::new(&format!("{}/chat", server.url())).unwrap();
        let reply = client.send("hello").await.unwrap();

        assert_eq!(reply, "Hi there!\n```py\nprint(1)\n```");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = ChatClient::new(&format!("{}/chat", server.url())).unwrap();
        match client.send("hello").await {
            Err(ChatError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected status error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_send_fails_on_missing_reply_field() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"answer":"wrong shape"}"#)
            .create_async()
            .await;

        let client = ChatClient::new(&format!("{}/chat", server.url())).unwrap();
        assert!(matches!(client.send("hello").await, Err(ChatError::Http(_))));
    }
}
