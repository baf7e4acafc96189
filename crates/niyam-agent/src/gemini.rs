use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use niyam_core::{
    completion::CompletionClient,
    types::{ChatMessage, ChatRole},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Google Gemini via the `generateContent` REST endpoint.
pub struct GeminiBackend {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    /// 0 = no limit.
    pub timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: model.into(),
            api_key: api_key.into(),
            temperature: 0.3,
            timeout_secs: 0,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches("models/")
        )
    }

    pub fn build_request(&self, system: &str, messages: &[ChatMessage]) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            }),
            contents: messages
                .iter()
                .map(|m| Content {
                    role: Some(
                        match m.role {
                            ChatRole::User => "user",
                            ChatRole::Assistant => "model",
                        }
                        .to_string(),
                    ),
                    parts: vec![Part {
                        text: m.content.clone(),
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

/// Concatenate the text parts of the first candidate.
pub fn parse_response(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).context("failed to parse Gemini response")?;
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        match parsed.prompt_feedback {
            Some(feedback) => bail!("Gemini returned no candidates: {feedback}"),
            None => bail!("Gemini returned no candidates"),
        }
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!(
            "Gemini returned empty content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

#[async_trait]
impl CompletionClient for GeminiBackend {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        let request_body = self.build_request(system, messages);

        info!(
            model = %self.model,
            messages = request_body.contents.len(),
            "calling gemini generateContent"
        );

        let mut builder = reqwest::Client::builder();
        if self.timeout_secs > 0 {
            builder = builder.timeout(std::time::Duration::from_secs(self.timeout_secs));
        }
        let client = builder.build()?;

        let response = match client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "gemini request timed out");
                bail!("Gemini request timed out after {}s", self.timeout_secs);
            },
            Err(e) => {
                warn!("gemini request failed: {}", e);
                return Err(e).context("Gemini request failed");
            },
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!(status = %status, "gemini returned non-200: {}", body);
            bail!("Gemini error {}: {}", status, body);
        }

        let output = parse_response(&body)?;
        info!(output_len = output.len(), "gemini response received");
        Ok(output)
    }

    fn describe(&self) -> String {
        format!("gemini:{}", self.model)
    }
}
