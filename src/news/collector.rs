use std::sync::Arc;
use chrono::{Local, NaiveDate};

use crate::assistant::Assistant;

/// Joins per-topic sections in the collected text.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

pub const SYSTEM_PROMPT: &str = "You are a news researcher. \
Use the web_search tool to find current news and summarize it faithfully. \
Never invent headlines.";

/// Asks the assistant for a short digest of each topic.
pub struct Collector {
    assistant: Arc<dyn Assistant>,
    max_steps: usize,
}

impl Collector {
    pub fn new(assistant: Arc<dyn Assistant>, max_steps: usize) -> Self {
        Self { assistant, max_steps }
    }

    pub async fn collect(&self, topics: &[String], language: &str) -> String {
        self.collect_on(topics, language, Local::now().date_naive()).await
    }

    /// Topics are collected one after another. A failed topic becomes an
    /// inline error note and the remaining topics still run.
    pub async fn collect_on(&self, topics: &[String], language: &str, today: NaiveDate) -> String {
        let mut sections = Vec::with_capacity(topics.len());

        for topic in topics {
            let prompt = topic_prompt(topic, language, today);
            match self.assistant.ask(&[], &prompt, self.max_steps).await {
                Ok(text) => {
                    tracing::info!(topic = %topic, chars = text.chars().count(), "topic collected");
                    sections.push(text);
                }
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "topic collection failed");
                    sections.push(error_section(topic, &e.to_string()));
                }
            }
        }

        sections.join(SECTION_SEPARATOR)
    }
}

pub fn topic_prompt(topic: &str, language: &str, today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d");
    format!(
        "Today is {date}.\n\
         Search for \"{topic} {date}\" and get today's or the most recent news.\n\
         \n\
         After searching, summarize the results in {language} using exactly this format:\n\
         \n\
         ## {topic}\n\
         \n\
         - **Headline 1**: one-sentence summary\n\
         - **Headline 2**: one-sentence summary\n\
         - **Headline 3**: one-sentence summary\n\
         \n\
         Rules:\n\
         - Run the search only once\n\
         - Leave out news older than one week\n"
    )
}

pub fn error_section(topic: &str, error: &str) -> String {
    format!("## {}\n\nAn error occurred while collecting this topic: {}", topic, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_topic_language_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let prompt = topic_prompt("Tech", "Japanese", date);
        assert!(prompt.contains("Today is 2026-10-19."));
        assert!(prompt.contains("\"Tech 2026-10-19\""));
        assert!(prompt.contains("in Japanese"));
        assert!(prompt.contains("## Tech\n"));
    }
}
