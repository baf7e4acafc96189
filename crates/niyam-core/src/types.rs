use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::CaseRecord;

// ── Participants ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Speaker {
    Judge,
    Defense,
    Consumer,
}

impl Speaker {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Judge => "JUDGE",
            Self::Defense => "DEFENSE",
            Self::Consumer => "CONSUMER",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ── Case Phase ───────────────────────────────────────────────────────────

/// Linear hearing stages. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasePhase {
    Opening,
    Arguments,
    Evidence,
    Closing,
    Verdict,
}

impl Default for CasePhase {
    fn default() -> Self {
        Self::Opening
    }
}

impl CasePhase {
    /// The following stage; `Verdict` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Opening => Self::Arguments,
            Self::Arguments => Self::Evidence,
            Self::Evidence => Self::Closing,
            Self::Closing | Self::Verdict => Self::Verdict,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Arguments => "arguments",
            Self::Evidence => "evidence",
            Self::Closing => "closing",
            Self::Verdict => "verdict",
        }
    }
}

impl std::fmt::Display for CasePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Completion Messages ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of the ordered history handed to a completion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Record Mutations ─────────────────────────────────────────────────────

/// A directive that was applied to the case record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Dotted field path, e.g. `Relief_Granted.Primary_Relief.Amount`.
    pub field: String,
    pub value: Value,
    pub reason: String,
}

// ── Proceedings ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceedingsLogEntry {
    pub speaker: Speaker,
    pub message: String,
    pub hearing: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<Mutation>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The judge emitted the verdict marker.
    Verdict,
    /// The consumer typed the exit token or closed input.
    Aborted,
    /// The main loop hit its turn ceiling.
    TurnLimit,
    /// A completion call failed mid-run.
    Failed,
}

impl Termination {
    pub fn concluded(&self) -> bool {
        matches!(self, Self::Verdict)
    }
}

/// `proceedings_log.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceedingsLog {
    pub case_title: String,
    pub simulation_date: DateTime<Local>,
    pub total_hearings: u32,
    pub total_turns: u32,
    pub case_concluded: bool,
    pub termination: Termination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_verdict: Option<String>,
    pub proceedings: Vec<ProceedingsLogEntry>,
}

/// `judgment_comparison.json`.
#[derive(Debug, Clone, Serialize)]
pub struct JudgmentComparison<'a> {
    pub original_prediction: &'a CaseRecord,
    pub final_judgment: &'a CaseRecord,
}

// ── Simulation Events ────────────────────────────────────────────────────

/// Progress notifications emitted by the simulation controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    SessionOpened {
        case_title: String,
        date: DateTime<Local>,
    },
    HearingStarted {
        hearing: u32,
        phase: CasePhase,
    },
    /// A participant is composing a reply (completion call in flight).
    Deliberating {
        speaker: Speaker,
    },
    Utterance {
        speaker: Speaker,
        text: String,
    },
    RecordUpdated {
        mutations: Vec<Mutation>,
    },
    Aborted,
    TurnLimitReached {
        turns: u32,
    },
    FinalJudgment {
        text: String,
    },
    ArtifactsSaved {
        final_judgment: std::path::PathBuf,
        proceedings_log: std::path::PathBuf,
        comparison: std::path::PathBuf,
    },
}
