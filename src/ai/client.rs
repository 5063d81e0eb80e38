use reqwest::Client;

use crate::config::OpenAiConfig;

use super::{
    error::CompletionError,
    inference::{ChatMessage, build_request, completions_url, parse_response},
};

#[derive(Clone)]
pub struct CompletionClient {
    http: Client,
    config: OpenAiConfig,
}

impl CompletionClient {
    pub fn new(http: Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }

    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!(target: "ai", "OpenAI API key is not configured");
            return Err(CompletionError::Configuration);
        };

        let response = self
            .http
            .post(completions_url(&self.config.base_url))
            .bearer_auth(api_key)
            .json(&build_request(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                target: "ai",
                status = status.as_u16(),
                body = %body,
                "completion endpoint error"
            );
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
            });
        }

        parse_response(response).await
    }
}
