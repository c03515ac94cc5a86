//! OpenAI-compatible completion client.
//!
//! One request per call, bounded by the configured timeout, no retries.
//! Failures map onto the upstream error taxonomy so the engine can degrade
//! to a fallback answer instead of surfacing an exception.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use docent_core::config::LlmConfig;
use docent_core::error::{DocentError, Result};
use docent_core::traits::{CompleteParams, CompletionBackend};

pub struct HttpCompletionBackend {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpCompletionBackend {
    /// Create from config. API key resolution: `llm.api_key` >
    /// `DOCENT_API_KEY` env var > empty (unconfigured).
    pub fn new(config: &LlmConfig) -> Self {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("DOCENT_API_KEY").unwrap_or_default()
        };
        Self {
            api_key,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }

    async fn complete(&self, prompt: &str, params: &CompleteParams) -> Result<String> {
        if !self.is_configured() {
            return Err(DocentError::UpstreamUnreachable(
                "completion backend not configured (missing API key or endpoint)".into(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!("Requesting completion from {} ({} prompt chars)", self.model, prompt.len());
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DocentError::UpstreamTimeout
                } else {
                    DocentError::UpstreamUnreachable(format!("{url}: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DocentError::UpstreamError {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let payload: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                DocentError::UpstreamTimeout
            } else {
                DocentError::UpstreamError {
                    status: status.as_u16(),
                    body: format!("invalid JSON: {e}"),
                }
            }
        })?;

        extract_content(&payload).ok_or(DocentError::UpstreamError {
            status: status.as_u16(),
            body: "no choices in response".into(),
        })
    }
}

/// Pull the completion text out of an OpenAI chat payload.
fn extract_content(payload: &Value) -> Option<String> {
    payload["choices"]
        .get(0)?
        .pointer("/message/content")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let payload = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "The answer."}, "finish_reason": "stop"}
            ]
        });
        assert_eq!(extract_content(&payload).as_deref(), Some("The answer."));
    }

    #[test]
    fn test_extract_content_malformed() {
        assert!(extract_content(&json!({})).is_none());
        assert!(extract_content(&json!({"choices": []})).is_none());
        assert!(extract_content(&json!({"choices": [{"message": {}}]})).is_none());
    }

    #[test]
    fn test_is_configured() {
        let mut config = LlmConfig::default();
        config.api_key = "sk-test".into();
        assert!(HttpCompletionBackend::new(&config).is_configured());

        // Without a key (and no env var) the backend reports unconfigured.
        config.api_key = String::new();
        unsafe { std::env::remove_var("DOCENT_API_KEY") };
        assert!(!HttpCompletionBackend::new(&config).is_configured());
    }
}
