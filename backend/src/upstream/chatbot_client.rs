use reqwest::Client as HttpClient;
use shared::{ChatReply, ChatRequest};
use std::time::Duration;
use url::Url;

use super::{UpstreamError, build_http_client, endpoint, ensure_success};

#[derive(Clone)]
pub struct ChatbotClient {
    http_client: HttpClient,
    chat_url: Url,
}

impl ChatbotClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            chat_url: endpoint(base_url, "chat")?,
        })
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, UpstreamError> {
        let response = self
            .http_client
            .post(self.chat_url.clone())
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let reply: ChatReply = response.json().await?;
        Ok(reply)
    }
}
