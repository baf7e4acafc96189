use anyhow::{Context, Result};
use async_trait::async_trait;
use niyam_court::HumanInput;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

const CONTROLS: &str = "\n\
Options:\n  \
- Type your argument/statement\n  \
- Type 'rest' to rest your case\n  \
- Type 'quit' to exit simulation\n";

/// The consumer typing at the terminal.
pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanInput for StdinInput {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        let banner = format!("\n{}\nYOUR TURN (Consumer/Complainant){CONTROLS}\n{prompt}", "-".repeat(40));
        stdout.write_all(banner.as_bytes()).await?;
        stdout.flush().await?;
        self.lines.next_line().await.context("reading consumer input")
    }
}
