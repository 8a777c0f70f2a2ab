// src/services/chat_relay.rs
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::session::Message;
use crate::config::Config;
use crate::error::{Error, Result};

const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Forwards the conversation to an OpenAI-compatible chat-completion API.
#[derive(Clone, Debug)]
pub struct ChatRelay {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatRelay {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.chat_url, &config.api_key, &config.model)
    }

    /// Reply text for the history. Failures come back as the reply itself.
    pub async fn complete(&self, messages: &[Message]) -> String {
        match self.try_complete(messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "chat completion failed");
                error_reply(&e)
            }
        }
    }

    pub async fn try_complete(&self, messages: &[Message]) -> Result<String> {
        let payload = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        tracing::debug!(model = %self.model, messages = messages.len(), "sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus { status, body });
        }

        let body = response.bytes().await?;
        parse_completion(&body)
    }
}

/// Turn a failed completion into the text stored as the assistant reply.
pub fn error_reply(err: &Error) -> String {
    format!("API error: {err}")
}

fn parse_completion(body: &[u8]) -> Result<String> {
    let parsed: CompletionResponse = serde_json::from_slice(body)
        .map_err(|e| Error::MalformedResponse(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("no choices in response".to_string()))?
        .message
        .content
        .unwrap_or_default();

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(Error::MalformedResponse("empty completion".to_string()));
    }
    Ok(trimmed.to_string())
}
