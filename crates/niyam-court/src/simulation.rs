//! The courtroom turn loop.
//!
//! One run: a scripted opening to the judge, then up to `max_turns` rounds of
//! consumer statement, defense reply and judicial response, then (only when
//! the judge signalled a verdict) one formal verdict call. The three run
//! documents are written however the loop ends, including when a completion
//! call fails.

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use niyam_core::{
    completion::CompletionClient,
    config::Config,
    history::ConversationHistory,
    persistence::{RunArtifacts, RunStore},
    policy::{Advancement, AdvancementPolicy, CuePolicy},
    record::CaseRecord,
    types::{
        CasePhase, Mutation, ProceedingsLog, ProceedingsLogEntry, SimulationEvent, Speaker,
        Termination,
    },
};
use tracing::{error, info, warn};

use crate::{
    defense::DefenseRole,
    input::{next_statement, HumanInput, Statement},
    judge::{JudgeReply, JudgeRole},
    narrator::Narrator,
    prompts,
};

pub const DEFAULT_MAX_TURNS: u32 = 20;

const CONSUMER_PROMPT: &str = "Your statement: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationSettings {
    pub max_turns: u32,
    /// 0 keeps the whole conversation.
    pub history_limit: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            history_limit: 0,
        }
    }
}

impl SimulationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_turns: config.max_turns,
            history_limit: config.history_limit,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub termination: Termination,
    pub turns: u32,
    pub hearings: u32,
    pub final_verdict: Option<String>,
    pub artifacts: RunArtifacts,
}

pub struct Simulation {
    record: CaseRecord,
    original: CaseRecord,
    judge: JudgeRole,
    defense: DefenseRole,
    policy: Box<dyn AdvancementPolicy>,
    history: ConversationHistory,
    proceedings: Vec<ProceedingsLogEntry>,
    settings: SimulationSettings,
    turns: u32,
    concluded: bool,
}

impl Simulation {
    pub fn new(
        record: CaseRecord,
        judge: Arc<dyn CompletionClient>,
        defense: Arc<dyn CompletionClient>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            original: record.clone(),
            record,
            judge: JudgeRole::new(judge),
            defense: DefenseRole::new(defense),
            policy: Box::new(CuePolicy::default()),
            history: ConversationHistory::bounded(settings.history_limit),
            proceedings: Vec::new(),
            settings,
            turns: 0,
            concluded: false,
        }
    }

    pub fn with_policy(mut self, policy: impl AdvancementPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// The live record.
    pub fn record(&self) -> &CaseRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut CaseRecord {
        &mut self.record
    }

    /// Snapshot taken at construction; never changes.
    pub fn original(&self) -> &CaseRecord {
        &self.original
    }

    pub fn proceedings(&self) -> &[ProceedingsLogEntry] {
        &self.proceedings
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn judge(&self) -> &JudgeRole {
        &self.judge
    }

    /// Run to completion and persist the run documents under `store`.
    ///
    /// A completion failure still writes the documents (termination
    /// `failed`) before the error is returned.
    pub async fn run(
        &mut self,
        input: &mut dyn HumanInput,
        narrator: &mut dyn Narrator,
        store: &RunStore,
    ) -> Result<SimulationReport> {
        let case_title = self.original.title();
        info!(case = %case_title, max_turns = self.settings.max_turns, "courtroom session opened");
        narrator.on_event(&SimulationEvent::SessionOpened {
            case_title: case_title.clone(),
            date: Local::now(),
        });
        narrator.on_event(&SimulationEvent::HearingStarted {
            hearing: self.judge.hearing_number(),
            phase: self.judge.phase(),
        });

        let (termination, final_verdict, failure) = match self.proceed(input, narrator).await {
            Ok((termination, verdict)) => (termination, verdict, None),
            Err(e) => {
                error!(turns = self.turns, "simulation failed: {e:#}");
                (Termination::Failed, None, Some(e))
            },
        };

        let now = Local::now();
        let log = ProceedingsLog {
            case_title,
            simulation_date: now,
            total_hearings: self.judge.hearing_number(),
            total_turns: self.turns,
            case_concluded: self.concluded,
            termination,
            final_verdict: final_verdict.clone(),
            proceedings: self.proceedings.clone(),
        };
        let artifacts = match store.persist(now, &self.original, &self.record, &log) {
            Ok(artifacts) => artifacts,
            Err(e) => {
                return Err(match failure {
                    Some(run_error) => {
                        e.context(format!("saving run documents after failure: {run_error:#}"))
                    },
                    None => e,
                });
            },
        };
        narrator.on_event(&SimulationEvent::ArtifactsSaved {
            final_judgment: artifacts.final_judgment.clone(),
            proceedings_log: artifacts.proceedings_log.clone(),
            comparison: artifacts.comparison.clone(),
        });

        if let Some(e) = failure {
            return Err(e);
        }
        Ok(SimulationReport {
            termination,
            turns: self.turns,
            hearings: self.judge.hearing_number(),
            final_verdict,
            artifacts,
        })
    }

    async fn proceed(
        &mut self,
        input: &mut dyn HumanInput,
        narrator: &mut dyn Narrator,
    ) -> Result<(Termination, Option<String>)> {
        let opening = self.judge_turn(narrator, prompts::OPENING_ADDRESS).await?;
        self.concluded = opening.concluded;

        let termination = loop {
            if self.concluded {
                break Termination::Verdict;
            }
            if self.turns >= self.settings.max_turns {
                warn!(turns = self.turns, "turn limit reached without a verdict");
                narrator.on_event(&SimulationEvent::TurnLimitReached { turns: self.turns });
                break Termination::TurnLimit;
            }
            self.turns += 1;

            let statement = match next_statement(input, CONSUMER_PROMPT).await? {
                Statement::Quit => {
                    info!(turns = self.turns, "simulation terminated by consumer");
                    narrator.on_event(&SimulationEvent::Aborted);
                    break Termination::Aborted;
                },
                Statement::Rest => prompts::REST_STATEMENT.to_string(),
                Statement::Speak(text) => text,
            };
            self.record_turn(narrator, Speaker::Consumer, statement.clone(), Vec::new());

            narrator.on_event(&SimulationEvent::Deliberating {
                speaker: Speaker::Defense,
            });
            let defense = self
                .defense
                .take_turn(&self.record, &self.history, &statement, self.judge.hearing_number())
                .await?;
            self.record_turn(narrator, Speaker::Defense, defense.clone(), Vec::new());

            let combined = prompts::combined_statement(&statement, &defense);
            let reply = self.judge_turn(narrator, &combined).await?;
            self.concluded = reply.concluded;
            self.advance(narrator, &reply.text);
        };

        if !termination.concluded() {
            return Ok((termination, None));
        }

        info!(hearing = self.judge.hearing_number(), "delivering final judgment");
        narrator.on_event(&SimulationEvent::Deliberating {
            speaker: Speaker::Judge,
        });
        let request = prompts::verdict_request(&self.record);
        let verdict = self
            .judge
            .take_turn(&mut self.record, &self.history, &request)
            .await?;
        if !verdict.mutations.is_empty() {
            narrator.on_event(&SimulationEvent::RecordUpdated {
                mutations: verdict.mutations,
            });
        }
        narrator.on_event(&SimulationEvent::FinalJudgment {
            text: verdict.text.clone(),
        });
        Ok((termination, Some(verdict.text)))
    }

    async fn judge_turn(&mut self, narrator: &mut dyn Narrator, incoming: &str) -> Result<JudgeReply> {
        narrator.on_event(&SimulationEvent::Deliberating {
            speaker: Speaker::Judge,
        });
        let reply = self
            .judge
            .take_turn(&mut self.record, &self.history, incoming)
            .await?;
        if !reply.mutations.is_empty() {
            narrator.on_event(&SimulationEvent::RecordUpdated {
                mutations: reply.mutations.clone(),
            });
        }
        self.record_turn(narrator, Speaker::Judge, reply.text.clone(), reply.mutations.clone());
        Ok(reply)
    }

    fn record_turn(
        &mut self,
        narrator: &mut dyn Narrator,
        speaker: Speaker,
        text: String,
        updates: Vec<Mutation>,
    ) {
        narrator.on_event(&SimulationEvent::Utterance {
            speaker,
            text: text.clone(),
        });
        self.history.push(speaker, text.clone());
        self.proceedings.push(ProceedingsLogEntry {
            speaker,
            message: text,
            hearing: self.judge.hearing_number(),
            updates,
        });
    }

    fn advance(&mut self, narrator: &mut dyn Narrator, judge_text: &str) {
        match self.policy.assess(judge_text) {
            Advancement::NextHearing => {
                self.judge.new_hearing();
                self.judge.advance_phase();
                info!(
                    hearing = self.judge.hearing_number(),
                    phase = %self.judge.phase(),
                    "court adjourned to next hearing"
                );
                narrator.on_event(&SimulationEvent::HearingStarted {
                    hearing: self.judge.hearing_number(),
                    phase: self.judge.phase(),
                });
            },
            Advancement::Closing => {
                self.judge.set_phase(CasePhase::Closing);
                info!(phase = %self.judge.phase(), "court moved to closing arguments");
            },
            Advancement::Continue => {},
        }
    }
}
