// suggestions/llm/openrouter.rs - OpenRouter chat-completion adapter

use super::LLMAdapter;
use crate::settings::Settings;
use crate::suggestions::types::LLMError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const APP_TITLE: &str = "Focus Rest";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenRouterAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    referer: String,
}

impl OpenRouterAdapter {
    pub fn new(api_key: String, base_url: String, model: String, referer: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            base_url,
            model,
            referer,
        }
    }

    /// Build from settings; `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let key = settings.openrouter_api_key.clone()?;
        Some(Self::new(
            key,
            settings.openrouter_base_url.clone(),
            settings.openrouter_model.clone(),
            settings.public_url.clone(),
        ))
    }
}

#[async_trait]
impl LLMAdapter for OpenRouterAdapter {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: 400,
            temperature: 0.9,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", APP_TITLE)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(format!("OpenRouter: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::ProviderError(format!(
                "OpenRouter {} ({}): {}",
                self.model, status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ProviderError(format!("OpenRouter parse: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LLMError::InvalidResponse)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
