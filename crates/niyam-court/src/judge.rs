use std::sync::Arc;

use anyhow::{Context, Result};
use niyam_core::{
    completion::CompletionClient,
    directive::apply_directives,
    history::ConversationHistory,
    record::CaseRecord,
    types::{CasePhase, ChatMessage, Mutation},
};
use tracing::{debug, info};

use crate::prompts;

/// Token a judge completion carries when it delivers the verdict.
pub const VERDICT_MARKER: &str = "[VERDICT]";

#[derive(Debug, Clone, PartialEq)]
pub struct JudgeReply {
    /// Completion text with the verdict marker and directive blocks removed.
    pub text: String,
    pub mutations: Vec<Mutation>,
    pub concluded: bool,
}

/// The presiding judge: phase and hearing state plus the only participant
/// allowed to amend the case record.
pub struct JudgeRole {
    client: Arc<dyn CompletionClient>,
    phase: CasePhase,
    hearing_number: u32,
}

impl JudgeRole {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            phase: CasePhase::Opening,
            hearing_number: 1,
        }
    }

    pub fn phase(&self) -> CasePhase {
        self.phase
    }

    pub fn hearing_number(&self) -> u32 {
        self.hearing_number
    }

    pub fn system_prompt(&self, record: &CaseRecord) -> String {
        prompts::judge_system(record, self.hearing_number, self.phase)
    }

    /// Move one stage forward; stays put at `verdict`.
    pub fn advance_phase(&mut self) {
        let next = self.phase.next();
        if next != self.phase {
            debug!(from = %self.phase, to = %next, "advancing case phase");
        }
        self.phase = next;
    }

    pub fn new_hearing(&mut self) {
        self.hearing_number += 1;
    }

    /// Jump to `phase` if it lies ahead; phases never move backwards.
    pub fn set_phase(&mut self, phase: CasePhase) {
        if phase > self.phase {
            self.phase = phase;
        }
    }

    /// One judicial turn. Completion failures propagate untouched; the
    /// record is only modified by directives in a successful reply.
    pub async fn take_turn(
        &mut self,
        record: &mut CaseRecord,
        history: &ConversationHistory,
        incoming: &str,
    ) -> Result<JudgeReply> {
        let system = self.system_prompt(record);
        let mut messages = history.messages();
        messages.push(ChatMessage::user(incoming));

        let raw = self
            .client
            .complete(&system, &messages)
            .await
            .with_context(|| format!("judge completion failed ({})", self.client.describe()))?;

        let concluded = raw.contains(VERDICT_MARKER);
        let text = if concluded {
            raw.replace(VERDICT_MARKER, "").trim().to_string()
        } else {
            raw
        };

        let outcome = apply_directives(&text, record);
        if !outcome.mutations.is_empty() || outcome.skipped > 0 {
            info!(
                hearing = self.hearing_number,
                applied = outcome.mutations.len(),
                skipped = outcome.skipped,
                "judge amended the case record"
            );
        }

        Ok(JudgeReply {
            text: outcome.clean_text,
            mutations: outcome.mutations,
            concluded,
        })
    }
}
