use anyhow::Result;
use async_trait::async_trait;

use crate::types::ChatMessage;

/// A hosted or local language model that turns a system context plus an
/// ordered message history into free text.
///
/// Implementations must surface transport failures, quota errors and
/// unusable responses as `Err`; callers decide whether to retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String>;

    /// Short identifier for logs (e.g. `gemini:gemini-2.5-pro`).
    fn describe(&self) -> String {
        "completion".to_string()
    }
}
