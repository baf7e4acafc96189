//! Hearing/phase advancement decided from the judge's reply text.

/// What the controller should do after a judge reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advancement {
    /// Adjourn: bump the hearing number and advance the phase.
    NextHearing,
    /// Jump straight to closing arguments.
    Closing,
    Continue,
}

pub trait AdvancementPolicy: Send + Sync {
    fn assess(&self, judge_reply: &str) -> Advancement;
}

/// Case-insensitive substring cues. Next-hearing cues take precedence.
#[derive(Debug, Clone)]
pub struct CuePolicy {
    next_hearing: Vec<String>,
    closing: Vec<String>,
}

impl Default for CuePolicy {
    fn default() -> Self {
        Self {
            next_hearing: vec!["next hearing".into()],
            closing: vec!["closing arguments".into(), "final arguments".into()],
        }
    }
}

impl CuePolicy {
    /// Default cues plus extra phrases, e.g. "next session".
    pub fn with_extra_cues(next_hearing: &[String], closing: &[String]) -> Self {
        let mut policy = Self::default();
        policy.next_hearing.extend(normalize(next_hearing));
        policy.closing.extend(normalize(closing));
        policy
    }
}

fn normalize(cues: &[String]) -> impl Iterator<Item = String> + '_ {
    cues.iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
}

impl AdvancementPolicy for CuePolicy {
    fn assess(&self, judge_reply: &str) -> Advancement {
        let lower = judge_reply.to_lowercase();
        if self.next_hearing.iter().any(|c| lower.contains(c.as_str())) {
            Advancement::NextHearing
        } else if self.closing.iter().any(|c| lower.contains(c.as_str())) {
            Advancement::Closing
        } else {
            Advancement::Continue
        }
    }
}
