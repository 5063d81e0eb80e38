use serde::Serialize;
use serde_json::Value;

use super::error::CompletionError;

pub const COMPLETION_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 10;

pub fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

pub fn build_request(messages: &[ChatMessage]) -> ChatCompletionRequest<'_> {
    ChatCompletionRequest {
        model: COMPLETION_MODEL,
        messages,
        max_tokens: MAX_TOKENS,
        temperature: 0.0,
    }
}

/// Pulls `choices[0].message.content` out of a JSON body. Only a body that is
/// not JSON at all is an error.
pub async fn parse_response(response: reqwest::Response) -> Result<String, CompletionError> {
    let body: Value = response.json().await?;
    Ok(first_content(&body))
}

/// The content string, or `""` when the path is missing, null or not a string.
fn first_content(body: &Value) -> String {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'static str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}
