use std::io::Write;

use niyam_core::types::{SimulationEvent, Speaker};
use niyam_court::Narrator;

const WIDTH: usize = 80;
const WRAP: usize = 76;

/// Renders the courtroom transcript on stdout.
pub struct ConsoleNarrator<W: Write + Send> {
    out: W,
}

impl ConsoleNarrator<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> ConsoleNarrator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &SimulationEvent) -> std::io::Result<()> {
        let out = &mut self.out;
        match event {
            SimulationEvent::SessionOpened { case_title, date } => {
                banner(out, "CONSUMER COURT SIMULATION")?;
                writeln!(out, "\nCASE: {case_title}")?;
                writeln!(out, "Date: {}", date.format("%d %B %Y"))?;
            },
            SimulationEvent::HearingStarted { hearing, phase } => {
                writeln!(out, "\n{}", "-".repeat(WIDTH))?;
                writeln!(out, "  HEARING #{hearing} | PHASE: {}", phase.as_str().to_uppercase())?;
                writeln!(out, "{}", "-".repeat(WIDTH))?;
            },
            SimulationEvent::Deliberating { speaker } => match speaker {
                Speaker::Judge => writeln!(out, "\n... The Hon'ble Judge is considering ...")?,
                Speaker::Defense => writeln!(out, "\n... Defense counsel is preparing a response ...")?,
                Speaker::Consumer => {},
            },
            SimulationEvent::Utterance { speaker, text } => {
                writeln!(out, "\n[{}]", speaker_label(*speaker))?;
                for line in wrap(text, WRAP) {
                    writeln!(out, "  {line}")?;
                }
            },
            SimulationEvent::RecordUpdated { mutations } => {
                writeln!(out, "\nCOURT RECORD UPDATE:")?;
                for m in mutations {
                    writeln!(out, "   * Field '{}' modified", m.field)?;
                    writeln!(out, "     Reason: {}", m.reason)?;
                }
            },
            SimulationEvent::Aborted => {
                writeln!(out, "\nSimulation terminated by user.")?;
            },
            SimulationEvent::TurnLimitReached { turns } => {
                writeln!(out, "\nTurn limit of {turns} reached without a verdict.")?;
            },
            SimulationEvent::FinalJudgment { text } => {
                banner(out, "FINAL JUDGMENT")?;
                for line in wrap(text, WRAP) {
                    writeln!(out, "{line}")?;
                }
            },
            SimulationEvent::ArtifactsSaved {
                final_judgment,
                proceedings_log,
                comparison,
            } => {
                writeln!(out, "\nFinal judgment saved to: {}", final_judgment.display())?;
                writeln!(out, "Proceedings log saved to: {}", proceedings_log.display())?;
                writeln!(out, "Judgment comparison saved to: {}", comparison.display())?;
                banner(out, "SIMULATION COMPLETE")?;
            },
        }
        out.flush()
    }
}

impl<W: Write + Send> Narrator for ConsoleNarrator<W> {
    fn on_event(&mut self, event: &SimulationEvent) {
        if let Err(e) = self.render(event) {
            tracing::warn!("console write failed: {e}");
        }
    }
}

fn speaker_label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Judge => "HON'BLE JUDGE",
        Speaker::Defense => "DEFENSE COUNSEL",
        Speaker::Consumer => "COMPLAINANT (YOU)",
    }
}

fn banner(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(WIDTH))?;
    writeln!(out, "{title:^WIDTH$}")?;
    writeln!(out, "{}", "=".repeat(WIDTH))
}

/// Greedy word wrap. Paragraph breaks are kept; a word longer than `width`
/// gets a line of its own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}
