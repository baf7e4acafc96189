use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use niyam_core::{
    completion::CompletionClient,
    types::{ChatMessage, ChatRole},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Calls a locally-hosted Ollama model via its native chat API.
///
/// Keeps case material on the local machine. Each call sends the full
/// history; the server holds no session.
pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// 0 = no limit.
    pub timeout_secs: u64,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.3,
            timeout_secs: 0,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn build_request(&self, system: &str, messages: &[ChatMessage]) -> OllamaChatRequest {
        let mut out = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            out.push(OllamaMessage {
                role: "system".into(),
                content: system.to_string(),
            });
        }
        out.extend(messages.iter().map(|m| OllamaMessage {
            role: match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            }
            .into(),
            content: m.content.clone(),
        }));
        OllamaChatRequest {
            model: self.model.clone(),
            messages: out,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    pub options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// Extract the reply text from an `/api/chat` response body.
pub fn parse_response(body: &str) -> Result<String> {
    let parsed: OllamaChatResponse =
        serde_json::from_str(body).context("failed to parse Ollama response")?;
    if parsed.message.content.trim().is_empty() {
        bail!("Ollama returned an empty message");
    }
    Ok(parsed.message.content)
}

#[async_trait]
impl CompletionClient for OllamaBackend {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        let request_body = self.build_request(system, messages);

        info!(
            model = %self.model,
            base_url = %self.base_url,
            messages = request_body.messages.len(),
            "calling ollama chat API"
        );

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));

        let mut builder = reqwest::Client::builder();
        if self.timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(self.timeout_secs));
        }
        let client = builder.build()?;

        let response = match client.post(&url).json(&request_body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "ollama request timed out");
                bail!("Ollama request timed out after {}s", self.timeout_secs);
            },
            Err(e) => {
                warn!("ollama request failed: {}", e);
                return Err(e).context("Ollama request failed");
            },
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, "ollama returned non-200: {}", body);
            bail!("Ollama error {}: {}", status, body);
        }

        let output = parse_response(&body)?;
        info!(output_len = output.len(), "ollama response received");
        Ok(output)
    }

    fn describe(&self) -> String {
        format!("ollama:{}", self.model)
    }
}
