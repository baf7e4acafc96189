use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;

/// Source of the human consumer's statements.
#[async_trait]
pub trait HumanInput: Send {
    /// One line of input. `Ok(None)` means the source is exhausted.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// What the consumer asked for on one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Quit,
    Rest,
    Speak(String),
}

impl Statement {
    /// `None` for blank input. Control words match case-insensitively.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match line.to_lowercase().as_str() {
            "quit" => Self::Quit,
            "rest" => Self::Rest,
            _ => Self::Speak(line.to_string()),
        })
    }
}

/// Read until a non-blank line arrives. End of input reads as `quit`.
pub async fn next_statement(input: &mut dyn HumanInput, prompt: &str) -> Result<Statement> {
    loop {
        match input.read_line(prompt).await? {
            None => return Ok(Statement::Quit),
            Some(line) => {
                if let Some(statement) = Statement::parse(&line) {
                    return Ok(statement);
                }
            },
        }
    }
}

/// Replays a fixed list of lines; used for tests and non-interactive runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl HumanInput for ScriptedInput {
    async fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
