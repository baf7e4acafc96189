use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::{
    record::CaseRecord,
    types::{JudgmentComparison, ProceedingsLog},
};

pub const FINAL_JUDGMENT_FILE: &str = "final_judgment.json";
pub const PROCEEDINGS_LOG_FILE: &str = "proceedings_log.json";
pub const COMPARISON_FILE: &str = "judgment_comparison.json";

/// Paths of the three documents written for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArtifacts {
    pub dir: PathBuf,
    pub final_judgment: PathBuf,
    pub proceedings_log: PathBuf,
    pub comparison: PathBuf,
}

/// Writes each simulation run into its own timestamped directory.
#[derive(Debug, Clone)]
pub struct RunStore {
    base_dir: PathBuf,
}

impl RunStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create `courtroom_<YYYYmmdd_HHMMSS>` under the base directory, adding a
    /// `_2`, `_3`, ... suffix if that name is taken.
    pub fn create_run_dir(&self, at: DateTime<Local>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating {}", self.base_dir.display()))?;
        let stem = format!("courtroom_{}", at.format("%Y%m%d_%H%M%S"));
        let mut attempt = 1u32;
        loop {
            let name = if attempt == 1 {
                stem.clone()
            } else {
                format!("{stem}_{attempt}")
            };
            let dir = self.base_dir.join(name);
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok(dir),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("creating {}", dir.display()));
                },
            }
        }
    }

    pub fn persist(
        &self,
        at: DateTime<Local>,
        original: &CaseRecord,
        final_record: &CaseRecord,
        log: &ProceedingsLog,
    ) -> Result<RunArtifacts> {
        let dir = self.create_run_dir(at)?;
        let artifacts = RunArtifacts {
            final_judgment: dir.join(FINAL_JUDGMENT_FILE),
            proceedings_log: dir.join(PROCEEDINGS_LOG_FILE),
            comparison: dir.join(COMPARISON_FILE),
            dir,
        };

        final_record.save(&artifacts.final_judgment)?;
        write_json(&artifacts.proceedings_log, log)?;
        write_json(
            &artifacts.comparison,
            &JudgmentComparison {
                original_prediction: original,
                final_judgment: final_record,
            },
        )?;

        info!(
            dir = %artifacts.dir.display(),
            turns = log.total_turns,
            concluded = log.case_concluded,
            "simulation artifacts saved"
        );
        Ok(artifacts)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
