// End-to-end runs of the courtroom loop against scripted completion backends
// and scripted consumer input. Run documents go to a temp directory.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use niyam_core::{
    completion::CompletionClient,
    persistence::RunStore,
    record::CaseRecord,
    types::{CasePhase, ChatMessage, SimulationEvent, Speaker, Termination},
};
use niyam_court::{
    prompts::REST_STATEMENT, Recorder, ScriptedInput, Silent, Simulation, SimulationSettings,
};
use serde_json::{json, Value};

// ── Scripted backend ─────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl ScriptedClient {
    fn replying<I: IntoIterator<Item = &'static str>>(replies: I) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            ..Self::default()
        })
    }

    fn always(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some(reply.to_string()),
            ..Self::default()
        })
    }

    fn failing(message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(anyhow::anyhow!(message))])),
            ..Self::default()
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> (String, Vec<ChatMessage>) {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), messages.to_vec()));
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(reply) => Ok(reply.clone()),
            None => bail!("script exhausted"),
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

fn case_record() -> CaseRecord {
    CaseRecord::from_value(json!({
        "Case_Summary": {
            "Title": "Sharma v. PhoneMart",
            "Consumer_Details": {"Claim_Amount": 25000}
        },
        "Relief_Granted": {
            "Primary_Relief": {"Type": "Refund", "Amount": 5000}
        }
    }))
    .unwrap()
}

fn simulation(judge: &Arc<ScriptedClient>, defense: &Arc<ScriptedClient>) -> Simulation {
    Simulation::new(
        case_record(),
        judge.clone(),
        defense.clone(),
        SimulationSettings::default(),
    )
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

const AMOUNT_DIRECTIVE: &str = "Having perused the invoice, the relief is revised.\n\
```json_update\n\
{\"field\": \"Relief_Granted.Primary_Relief.Amount\", \"value\": 7500, \"reason\": \"revised upon evidence\"}\n\
```";

// ── Termination ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_turn_ceiling_stops_after_twenty_turns() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::always("Please continue.");
    let defense = ScriptedClient::always("My client denies the allegation.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new((0..25).map(|i| format!("Statement {i}")));

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::TurnLimit);
    assert_eq!(report.turns, 20);
    assert!(report.final_verdict.is_none());
    assert_eq!(input.remaining(), 5);
    assert_eq!(judge.call_count(), 21);
    assert_eq!(defense.call_count(), 20);
    assert_eq!(sim.proceedings().len(), 1 + 20 * 3);

    let log = read_json(&report.artifacts.proceedings_log);
    assert_eq!(log["total_turns"], 20);
    assert_eq!(log["case_concluded"], false);
    assert_eq!(log["termination"], "turn_limit");
    assert!(log.get("final_verdict").is_none());
}

#[tokio::test]
async fn test_quit_first_writes_all_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying(["The court is in session."]);
    let defense = ScriptedClient::always("unused");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["quit"]);

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::Aborted);
    assert_eq!(report.turns, 1);
    assert_eq!(judge.call_count(), 1);
    assert_eq!(defense.call_count(), 0);
    assert!(report.artifacts.final_judgment.is_file());
    assert!(report.artifacts.proceedings_log.is_file());
    assert!(report.artifacts.comparison.is_file());
    assert!(report
        .artifacts
        .dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("courtroom_"));

    let log = read_json(&report.artifacts.proceedings_log);
    assert_eq!(log["case_title"], "Sharma v. PhoneMart");
    assert_eq!(log["total_hearings"], 1);
    assert_eq!(log["total_turns"], 1);
    assert_eq!(log["termination"], "aborted");
    assert_eq!(log["proceedings"].as_array().unwrap().len(), 1);
    assert_eq!(log["proceedings"][0]["speaker"], "JUDGE");

    let comparison = read_json(&report.artifacts.comparison);
    assert_eq!(comparison["original_prediction"], comparison["final_judgment"]);
}

#[tokio::test]
async fn test_blank_lines_and_end_of_input() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::always("Go on.");
    let defense = ScriptedClient::always("Denied.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["", "   ", "The screen went dark."]);

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::Aborted);
    assert_eq!(report.turns, 2);
    assert_eq!(sim.proceedings().len(), 4);
    assert_eq!(sim.proceedings()[1].message, "The screen went dark.");
}

// ── Record mutation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_judge_directive_amends_record_and_log() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying(["The court is in session.", AMOUNT_DIRECTIVE]);
    let defense = ScriptedClient::always("The invoice is disputed.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["Here is the invoice.", "quit"]);

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(
        sim.record().get("Relief_Granted.Primary_Relief.Amount"),
        Some(&json!(7500))
    );
    assert_eq!(
        sim.original().get("Relief_Granted.Primary_Relief.Amount"),
        Some(&json!(5000))
    );

    let entry = &sim.proceedings()[3];
    assert_eq!(entry.speaker, Speaker::Judge);
    assert_eq!(entry.message, "Having perused the invoice, the relief is revised.");
    assert_eq!(entry.updates.len(), 1);
    assert_eq!(entry.updates[0].field, "Relief_Granted.Primary_Relief.Amount");
    assert_eq!(entry.updates[0].value, json!(7500));
    assert_eq!(entry.updates[0].reason, "revised upon evidence");

    let saved = read_json(&report.artifacts.final_judgment);
    assert_eq!(saved["Relief_Granted"]["Primary_Relief"]["Amount"], 7500);
    let comparison = read_json(&report.artifacts.comparison);
    assert_eq!(
        comparison["original_prediction"]["Relief_Granted"]["Primary_Relief"]["Amount"],
        5000
    );
    let log = read_json(&report.artifacts.proceedings_log);
    assert_eq!(log["proceedings"][3]["updates"][0]["reason"], "revised upon evidence");
    assert!(log["proceedings"][1].get("updates").is_none());
}

#[tokio::test]
async fn test_original_snapshot_is_independent() {
    let judge = ScriptedClient::always("x");
    let defense = ScriptedClient::always("y");
    let mut sim = simulation(&judge, &defense);

    sim.record_mut()
        .set("Case_Summary.Title", json!("Changed"))
        .unwrap();
    sim.record_mut()
        .set("Relief_Granted.Primary_Relief.Amount", json!(1))
        .unwrap();

    assert_eq!(sim.original().title(), "Sharma v. PhoneMart");
    assert_eq!(
        sim.original().get("Relief_Granted.Primary_Relief.Amount"),
        Some(&json!(5000))
    );
}

// ── Verdict ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verdict_marker_ends_loop_and_requests_formal_judgment() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying([
        "The court is in session.",
        "[VERDICT] I have heard enough.",
        "ORDER: The complaint is allowed with costs of Rs. 2000.",
    ]);
    let defense = ScriptedClient::always("No further submissions.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["The phone failed twice.", "never read"]);
    let mut narrator = Recorder::default();

    let report = sim
        .run(&mut input, &mut narrator, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::Verdict);
    assert_eq!(report.turns, 1);
    assert_eq!(input.remaining(), 1);
    assert_eq!(judge.call_count(), 3);
    assert_eq!(
        report.final_verdict.as_deref(),
        Some("ORDER: The complaint is allowed with costs of Rs. 2000.")
    );
    assert_eq!(sim.proceedings()[3].message, "I have heard enough.");

    let (system, messages) = judge.last_call();
    assert!(system.contains("Primary Relief: Refund - Rs. 5000"));
    let request = &messages.last().unwrap().content;
    assert!(request.contains("deliver the final formal judgment"));
    assert!(request.contains("Current Relief in Record:"));

    assert!(narrator.events.contains(&SimulationEvent::FinalJudgment {
        text: "ORDER: The complaint is allowed with costs of Rs. 2000.".into()
    }));
    assert!(matches!(
        narrator.events.last(),
        Some(SimulationEvent::ArtifactsSaved { .. })
    ));

    let log = read_json(&report.artifacts.proceedings_log);
    assert_eq!(log["case_concluded"], true);
    assert_eq!(log["termination"], "verdict");
    assert_eq!(
        log["final_verdict"],
        "ORDER: The complaint is allowed with costs of Rs. 2000."
    );
}

#[tokio::test]
async fn test_verdict_in_opening_skips_loop() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying([
        "[VERDICT] The opposite party has conceded liability.",
        "ORDER: Refund of Rs. 5000 is directed.",
    ]);
    let defense = ScriptedClient::always("unused");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["never read"]);

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::Verdict);
    assert_eq!(report.turns, 0);
    assert_eq!(input.remaining(), 1);
    assert_eq!(defense.call_count(), 0);
    assert_eq!(judge.call_count(), 2);
    assert_eq!(
        report.final_verdict.as_deref(),
        Some("ORDER: Refund of Rs. 5000 is directed.")
    );
    assert_eq!(sim.proceedings().len(), 1);
    assert_eq!(
        sim.proceedings()[0].message,
        "The opposite party has conceded liability."
    );
    let (_, messages) = judge.last_call();
    assert!(messages
        .last()
        .unwrap()
        .content
        .contains("deliver the final formal judgment"));
}

#[tokio::test]
async fn test_directive_in_formal_verdict_reaches_saved_record() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying([
        "The court is in session.",
        "[VERDICT] Arguments are closed.",
        "ORDER: Compensation is enhanced.\n\
```json_update\n\
{\"field\": \"Relief_Granted.Primary_Relief.Amount\", \"value\": 9000, \"reason\": \"mental agony\"}\n\
```",
    ]);
    let defense = ScriptedClient::always("Nothing further.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["The handset was replaced twice."]);
    let mut narrator = Recorder::default();

    let report = sim
        .run(&mut input, &mut narrator, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(
        report.final_verdict.as_deref(),
        Some("ORDER: Compensation is enhanced.")
    );
    assert_eq!(
        sim.record().get("Relief_Granted.Primary_Relief.Amount"),
        Some(&json!(9000))
    );
    assert!(narrator.events.iter().any(|e| matches!(
        e,
        SimulationEvent::RecordUpdated { mutations } if mutations[0].reason == "mental agony"
    )));

    let saved = read_json(&report.artifacts.final_judgment);
    assert_eq!(saved["Relief_Granted"]["Primary_Relief"]["Amount"], 9000);
    let comparison = read_json(&report.artifacts.comparison);
    assert_eq!(
        comparison["original_prediction"]["Relief_Granted"]["Primary_Relief"]["Amount"],
        5000
    );
    assert_eq!(
        comparison["final_judgment"]["Relief_Granted"]["Primary_Relief"]["Amount"],
        9000
    );
}

// ── Consumer controls ────────────────────────────────────────────────────

#[tokio::test]
async fn test_rest_substitutes_closing_statement() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::always("Noted.");
    let defense = ScriptedClient::always("We oppose.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["ReSt", "quit"]);

    sim.run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(sim.proceedings()[1].speaker, Speaker::Consumer);
    assert_eq!(sim.proceedings()[1].message, REST_STATEMENT);
    let (system, _) = defense.last_call();
    assert!(system.contains(REST_STATEMENT));
    let (_, messages) = judge.last_call();
    assert!(messages
        .last()
        .unwrap()
        .content
        .contains(&format!("The Consumer has stated: \"{REST_STATEMENT}\"")));
}

// ── Hearings and phases ──────────────────────────────────────────────────

#[tokio::test]
async fn test_next_hearing_cue_advances_hearing_and_phase() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying([
        "The court is in session.",
        "The matter is adjourned to the Next Hearing.",
        "Continue.",
    ]);
    let defense = ScriptedClient::always("Denied.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["first", "second", "quit"]);
    let mut narrator = Recorder::default();

    let report = sim
        .run(&mut input, &mut narrator, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    let hearings: Vec<(Speaker, u32)> = sim
        .proceedings()
        .iter()
        .map(|e| (e.speaker, e.hearing))
        .collect();
    assert_eq!(
        hearings,
        vec![
            (Speaker::Judge, 1),
            (Speaker::Consumer, 1),
            (Speaker::Defense, 1),
            (Speaker::Judge, 1),
            (Speaker::Consumer, 2),
            (Speaker::Defense, 2),
            (Speaker::Judge, 2),
        ]
    );
    assert_eq!(report.hearings, 2);
    assert_eq!(sim.judge().phase(), CasePhase::Arguments);
    assert!(narrator.events.contains(&SimulationEvent::HearingStarted {
        hearing: 2,
        phase: CasePhase::Arguments
    }));
    assert!(defense.last_call().0.contains("Current hearing: #2"));
}

#[tokio::test]
async fn test_closing_cue_forces_closing_phase() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying(["Session open.", "I will now hear final arguments."]);
    let defense = ScriptedClient::always("Denied.");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["statement", "quit"]);

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(sim.judge().phase(), CasePhase::Closing);
    assert_eq!(report.hearings, 1);
}

#[tokio::test]
async fn test_bounded_history_limits_context() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::always("Go on.");
    let defense = ScriptedClient::always("Denied.");
    let mut sim = Simulation::new(
        case_record(),
        judge.clone(),
        defense.clone(),
        SimulationSettings {
            max_turns: 3,
            history_limit: 4,
        },
    );
    let mut input = ScriptedInput::new(["a", "b", "c"]);

    let report = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::TurnLimit);
    assert_eq!(sim.history().len(), 4);
    assert_eq!(sim.history().dropped(), 6);
    let (_, messages) = judge.last_call();
    assert_eq!(messages.len(), 5);
    assert_eq!(sim.proceedings().len(), 10);
}

// ── Failure ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_completion_failure_still_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let judge = ScriptedClient::replying(["The court is in session."]);
    let defense = ScriptedClient::failing("service unavailable");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["The phone died."]);

    let err = sim
        .run(&mut input, &mut Silent, &RunStore::new(tmp.path()))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("service unavailable"));

    let runs: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(runs.len(), 1);
    let log = read_json(&runs[0].join("proceedings_log.json"));
    assert_eq!(log["termination"], "failed");
    assert_eq!(log["case_concluded"], false);
    assert_eq!(log["total_turns"], 1);
    assert_eq!(log["proceedings"].as_array().unwrap().len(), 2);
    assert!(runs[0].join("final_judgment.json").is_file());
    assert!(runs[0].join("judgment_comparison.json").is_file());
}

#[tokio::test]
async fn test_persist_failure_keeps_completion_error() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("runs");
    std::fs::write(&blocker, "not a directory").unwrap();
    let judge = ScriptedClient::replying(["The court is in session."]);
    let defense = ScriptedClient::failing("service unavailable");
    let mut sim = simulation(&judge, &defense);
    let mut input = ScriptedInput::new(["The phone died."]);

    let err = sim
        .run(&mut input, &mut Silent, &RunStore::new(&blocker))
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("saving run documents after failure"), "got: {message}");
    assert!(message.contains("service unavailable"), "got: {message}");
}
