//! HTTP implementation of [`ChatBackend`].

use url::Url;

use super::{ChatBackend, ChatError};
use crate::wire::{CHAT_PATH, ChatReply, ChatRequest};

/// Talks to a `/chat/` endpoint over HTTP.
///
/// The status code is not consulted: the body alone decides success, so an
/// error body on a 200 is a failure and a well-formed reply on any status
/// is honoured.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(base_url.as_ref())?.join(CHAT_PATH)?;
        Ok(Self { endpoint, http })
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let body = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), body_length = bytes.len(), "Chat reply received");

        ChatReply::from_slice(&bytes)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_chat_path() {
        let backend = HttpChatBackend::new("http://127.0.0.1:8000").unwrap();
        assert_eq!(backend.endpoint().as_str(), "http://127.0.0.1:8000/chat/");

        let backend = HttpChatBackend::new("https://shop.example.com/").unwrap();
        assert_eq!(backend.endpoint().as_str(), "https://shop.example.com/chat/");
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(HttpChatBackend::new("not a url").is_err());
    }
}
