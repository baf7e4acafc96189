use std::sync::Arc;

use anyhow::{Context, Result};
use niyam_core::{completion::CompletionClient, history::ConversationHistory, record::CaseRecord};

use crate::prompts;

/// Counsel for the opposite party. Reads the record, never writes it, and
/// returns its completion verbatim.
pub struct DefenseRole {
    client: Arc<dyn CompletionClient>,
}

impl DefenseRole {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn take_turn(
        &self,
        record: &CaseRecord,
        history: &ConversationHistory,
        last_statement: &str,
        hearing: u32,
    ) -> Result<String> {
        let system = prompts::defense_system(record, last_statement, hearing);
        self.client
            .complete(&system, &history.messages())
            .await
            .with_context(|| format!("defense completion failed ({})", self.client.describe()))
    }
}
