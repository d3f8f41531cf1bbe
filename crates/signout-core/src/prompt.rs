//! Terminal-backed override prompt.
//!
//! Writes the conflicted element names to the writer (stderr for
//! [`TerminalPrompt::stdio`]) and reads a yes/no line back.

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    sync::Mutex,
};

use crate::collaborators::{DecisionError, InteractiveDecision};

/// Unrecognized answers tolerated before giving up.
const MAX_ATTEMPTS: usize = 3;

/// How a single line of input was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognized,
}

/// Interpret one line typed by the operator. An empty line means "no".
#[must_use]
pub fn parse_answer(line: &str) -> Answer {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Answer::Yes,
        "" | "n" | "no" => Answer::No,
        _ => Answer::Unrecognized,
    }
}

fn render_question(conflicted: &[String]) -> String {
    let listing: String = conflicted
        .iter()
        .map(|name| format!("  - {name}\n"))
        .collect();
    format!(
        "{} element(s) are signed out to another user:\n{listing}Override the signout? [y/N] ",
        conflicted.len()
    )
}

/// Asks the override question on a line-oriented terminal.
pub struct TerminalPrompt<R, W> {
    reader: Mutex<BufReader<R>>,
    writer: Mutex<W>,
}

impl TerminalPrompt<tokio::io::Stdin, tokio::io::Stderr> {
    /// Prompt on stderr, read answers from stdin.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stderr())
    }
}

impl<R, W> TerminalPrompt<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(BufReader::new(reader)),
            writer: Mutex::new(writer),
        }
    }

    /// Give back the underlying reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (
            self.reader.into_inner().into_inner(),
            self.writer.into_inner(),
        )
    }

    async fn write(&self, text: &str) -> Result<(), DecisionError> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(text.as_bytes())
            .await
            .map_err(|e| DecisionError::PromptUnavailable(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| DecisionError::PromptUnavailable(e.to_string()))
    }
}

#[async_trait]
impl<R, W> InteractiveDecision for TerminalPrompt<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm_override(&self, conflicted: &[String]) -> Result<Option<bool>, DecisionError> {
        let mut reader = self.reader.lock().await;
        self.write(&render_question(conflicted)).await?;

        for _ in 0..MAX_ATTEMPTS {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| DecisionError::PromptUnavailable(e.to_string()))?;
            if read == 0 {
                tracing::debug!("Prompt input closed without an answer");
                return Ok(None);
            }
            match parse_answer(&line) {
                Answer::Yes => return Ok(Some(true)),
                Answer::No => return Ok(Some(false)),
                Answer::Unrecognized => self.write("Please answer y or n: ").await?,
            }
        }

        tracing::debug!(attempts = MAX_ATTEMPTS, "No usable answer to override prompt");
        Ok(None)
    }
}
