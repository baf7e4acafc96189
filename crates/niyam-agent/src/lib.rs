pub mod gemini;
pub mod ollama;

use std::sync::Arc;

use anyhow::{bail, Result};
use niyam_core::{completion::CompletionClient, config::Config};

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

/// Build the configured backend at the given sampling temperature.
pub fn client_from_config(config: &Config, temperature: f32) -> Result<Arc<dyn CompletionClient>> {
    match config.backend.as_str() {
        "gemini" => Ok(Arc::new(
            GeminiBackend::new(&config.google_api_key, &config.model)
                .with_base_url(&config.gemini_base_url)
                .with_timeout(config.completion_timeout_s)
                .with_temperature(temperature),
        )),
        "ollama" => Ok(Arc::new(
            OllamaBackend::new(&config.ollama_base_url, &config.model)
                .with_timeout(config.completion_timeout_s)
                .with_temperature(temperature),
        )),
        other => bail!("unsupported completion backend '{other}'"),
    }
}
