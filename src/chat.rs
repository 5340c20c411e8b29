//! Line-oriented chat loop over an [`Assistant`] with thread memory.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::assistant::Assistant;
use crate::thread::ThreadStore;
use crate::types::ChatTurn;

/// Inputs that end the session, compared case-insensitively.
pub const QUIT_KEYWORDS: &[&str] = &["quit", "exit", "終了"];

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Use web_search for recent events or facts you are unsure about, \
and run_code for calculations, data processing or analysis. \
Answer in the language the user writes in.";

/// What the session did with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Blank line, nothing sent
    Ignore,
    Quit,
    Answer(String),
    /// The turn failed; the session stays usable.
    Failed(String),
}

pub struct ChatSession {
    assistant: Arc<dyn Assistant>,
    store:     Arc<dyn ThreadStore>,
    thread_id: String,
    max_steps: usize,
}

impl ChatSession {
    pub fn new(
        assistant: Arc<dyn Assistant>,
        store:     Arc<dyn ThreadStore>,
        thread_id: impl Into<String>,
        max_steps: usize,
    ) -> Self {
        Self { assistant, store, thread_id: thread_id.into(), max_steps }
    }

    pub async fn handle_line(&self, line: &str) -> ChatReply {
        let input = line.trim();
        if input.is_empty() {
            return ChatReply::Ignore;
        }
        if is_quit(input) {
            return ChatReply::Quit;
        }

        let transcript = match self.store.load(&self.thread_id).await {
            Ok(turns) => turns,
            Err(e) => return ChatReply::Failed(format!("could not load conversation: {}", e)),
        };

        match self.assistant.ask(&transcript, input, self.max_steps).await {
            Ok(answer) => {
                let turns = [ChatTurn::user(input), ChatTurn::assistant(answer.clone())];
                if let Err(e) = self.store.append(&self.thread_id, &turns).await {
                    tracing::warn!(thread = %self.thread_id, error = %e, "failed to save conversation turn");
                }
                ChatReply::Answer(answer)
            }
            Err(e) => {
                tracing::warn!(thread = %self.thread_id, error = %e, "chat turn failed");
                ChatReply::Failed(e.to_string())
            }
        }
    }

    /// Reads lines until a quit keyword or end of input.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let rule = "=".repeat(50);
        let banner = format!(
            "{rule}\nAI Assistant\nTools: web search, sandboxed code execution, conversation memory\n\
             Type 'quit' or 'exit' to leave\n{rule}\n\n"
        );
        writer.write_all(banner.as_bytes()).await?;

        let mut lines = reader.lines();
        loop {
            writer.write_all(b"You: ").await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                writer.write_all(b"\n").await?;
                break;
            };

            let out = match self.handle_line(&line).await {
                ChatReply::Ignore      => continue,
                ChatReply::Quit        => {
                    writer.write_all(b"Goodbye!\n").await?;
                    break;
                }
                ChatReply::Answer(a)   => format!("\nAI: {}\n\n", a),
                ChatReply::Failed(err) => format!("\nAn error occurred: {}\n\n", err),
            };
            writer.write_all(out.as_bytes()).await?;
        }

        writer.flush().await
    }
}

fn is_quit(input: &str) -> bool {
    let lower = input.to_lowercase();
    QUIT_KEYWORDS.iter().any(|k| *k == lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_keywords_ignore_case() {
        assert!(is_quit("QUIT"));
        assert!(is_quit("Exit"));
        assert!(is_quit("終了"));
        assert!(!is_quit("quit now"));
    }
}
