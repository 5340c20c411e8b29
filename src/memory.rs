use crate::types::{AgentConfig, ChatTurn, HistoryEntry, TokenUsage, ToolCall, ToolResult};
use crate::trace::{TraceEntry, Trace};
use chrono::Utc;

/// Everything one agent run knows. State handlers read and write it; the
/// LLM caller turns it into a chat request with [`AgentMemory::build_messages`].
#[derive(Debug)]
pub struct AgentMemory {
    // ── Task definition ──────────────────────────────────
    /// The user message this run must answer
    pub prompt:             String,
    /// The system prompt to prepend to every LLM call
    pub system_prompt:      String,
    /// Earlier turns of the conversation, oldest first
    pub transcript:         Vec<ChatTurn>,

    // ── Execution state ──────────────────────────────────
    /// Current step number (incremented at start of each Planning cycle)
    pub step:               usize,

    // ── Tool call lifecycle ──────────────────────────────
    /// Set by Planning, consumed by Acting
    pub pending_tool_calls: Vec<ToolCall>,
    /// Set by Acting, consumed by Observing
    pub last_results:       Vec<ToolResult>,

    // ── History and results ──────────────────────────────
    pub history:            Vec<HistoryEntry>,
    pub final_answer:       Option<String>,
    /// Set when the run hits an unrecoverable error
    pub error:              Option<String>,

    pub config:             AgentConfig,
    pub total_usage:        TokenUsage,
    pub trace:              Trace,
}

impl AgentMemory {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt:             prompt.into(),
            system_prompt:      String::new(),
            transcript:         Vec::new(),
            step:               0,
            pending_tool_calls: Vec::new(),
            last_results:       Vec::new(),
            history:            Vec::new(),
            final_answer:       None,
            error:              None,
            config:             AgentConfig::default(),
            total_usage:        TokenUsage::default(),
            trace:              Trace::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_transcript(mut self, transcript: Vec<ChatTurn>) -> Self {
        self.transcript = transcript;
        self
    }

    /// Records an event into the trace log. Called by all state handlers.
    pub fn log(&mut self, state: &str, event: &str, data: &str) {
        tracing::debug!(state, event, data, step = self.step, "agent trace");
        self.trace.record(TraceEntry {
            step:      self.step,
            state:     state.to_string(),
            event:     event.to_string(),
            data:      data.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Builds the OpenAI-style messages array.
    ///
    /// Order: system prompt, earlier conversation turns, the current prompt,
    /// then one assistant message per step carrying all of that step's tool
    /// calls, each followed by its tool result message.
    pub fn build_messages(&self) -> Vec<serde_json::Value> {
        let mut messages = Vec::new();

        if !self.system_prompt.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": self.system_prompt
            }));
        }

        for turn in &self.transcript {
            messages.push(serde_json::json!({
                "role": turn.role.as_str(),
                "content": turn.content
            }));
        }

        messages.push(serde_json::json!({
            "role": "user",
            "content": &self.prompt
        }));

        let mut steps: Vec<Vec<&HistoryEntry>> = Vec::new();
        for entry in &self.history {
            match steps.last_mut() {
                Some(last) if last[0].step == entry.step => last.push(entry),
                _ => steps.push(vec![entry]),
            }
        }

        for (n, step_entries) in steps.into_iter().enumerate() {
            let mut calls = Vec::new();
            let mut results = Vec::new();

            for (i, entry) in step_entries.into_iter().enumerate() {
                let tool_id = entry.tool.id.clone()
                    .unwrap_or_else(|| format!("call_{}_{}", n, i));

                calls.push(serde_json::json!({
                    "id": tool_id,
                    "type": "function",
                    "function": {
                        "name": entry.tool.name,
                        "arguments": serde_json::to_string(&entry.tool.args).unwrap_or_default()
                    }
                }));

                results.push(serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_id,
                    "content": entry.observation
                }));
            }

            messages.push(serde_json::json!({
                "role": "assistant",
                "content": null,
                "tool_calls": calls
            }));
            messages.extend(results);
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_replay_transcript_before_prompt() {
        let memory = AgentMemory::new("and now?")
            .with_system_prompt("be brief")
            .with_transcript(vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")]);

        let roles: Vec<_> = memory.build_messages().iter()
            .map(|m| m["role"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }

    #[test]
    fn tool_calls_of_one_step_share_an_assistant_message() {
        let mut memory = AgentMemory::new("q");
        for (i, name) in ["web_search", "run_code"].into_iter().enumerate() {
            memory.history.push(HistoryEntry {
                step:        1,
                tool:        ToolCall::new(name, json!({})).with_id(format!("id{}", i)),
                observation: "SUCCESS: ok".to_string(),
                success:     true,
            });
        }

        let messages = memory.build_messages();
        // user, assistant(2 calls), tool, tool
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1]["tool_calls"].as_array().map(Vec::len), Some(2));
        assert_eq!(messages[3]["tool_call_id"], "id1");
    }
}
