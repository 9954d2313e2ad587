//! LLM provider client.
//!
//! Thin chat-completions client used by the router for intent
//! classification. Groq exposes an OpenAI-compatible API, so one request
//! shape covers both providers; anything else falls back to an echo for
//! offline runs and tests.

use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::error::{HelplineError, HelplineResult};

/// LLM configuration for one client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f64,
}

impl LlmConfig {
    /// Groq client config as the deployment uses it.
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider: "groq".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            temperature,
        }
    }
}

/// Chat-completions client.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> HelplineResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// One system+user exchange, returning the assistant text.
    pub async fn chat(&self, system_prompt: &str, user_message: &str) -> HelplineResult<String> {
        match self.config.provider.as_str() {
            "groq" | "openai" => self.chat_openai_compatible(system_prompt, user_message).await,
            _ => {
                // Echo fallback for offline/testing providers.
                Ok(format!("Echo: {}", user_message))
            }
        }
    }

    async fn chat_openai_compatible(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> HelplineResult<String> {
        let base_url = self
            .config
            .base_url
            .as_ref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                if self.config.provider == "groq" {
                    "https://api.groq.com/openai/v1".to_string()
                } else {
                    "https://api.openai.com/v1".to_string()
                }
            });

        let url = format!("{}/chat/completions", base_url);

        let request_body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ],
            "temperature": self.config.temperature,
            "max_tokens": 1000
        });

        info!(
            "Sending to LLM - system prompt {} chars, user message {} chars",
            system_prompt.len(),
            user_message.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(HelplineError::Llm(format!(
                "provider API error: {}",
                error_text
            )));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| HelplineError::Llm("invalid response format".to_string()))?
            .to_string();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_config_defaults() {
        let config = LlmConfig::groq("key", "llama-3.1-8b-instant", 0.3);
        assert_eq!(config.provider, "groq");
        assert!(config.base_url.is_none());
    }

    #[tokio::test]
    async fn test_unknown_provider_echoes() {
        let client = LlmClient::new(LlmConfig {
            provider: "offline".to_string(),
            api_key: String::new(),
            model: "none".to_string(),
            base_url: None,
            temperature: 0.0,
        })
        .unwrap();

        let reply = client.chat("system", "hello").await.unwrap();
        assert_eq!(reply, "Echo: hello");
    }
}
