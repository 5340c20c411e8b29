use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named state in the agent's state machine.
///
/// States are identified by their string name. The runtime ships with
/// six well-known constructors (`State::idle()`, `State::planning()`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State(pub String);

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `"Done"` and `"Error"` end a run.
    pub fn is_terminal(&self) -> bool {
        self.0 == "Done" || self.0 == "Error"
    }

    // ── Well-known built-in state constructors ──────────────────────────
    pub fn idle()      -> Self { Self::new("Idle") }
    pub fn planning()  -> Self { Self::new("Planning") }
    pub fn acting()    -> Self { Self::new("Acting") }
    pub fn observing() -> Self { Self::new("Observing") }
    pub fn done()      -> Self { Self::new("Done") }
    pub fn error()     -> Self { Self::new("Error") }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: HashMap<String, serde_json::Value>,
    pub id:   Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        let args = match args {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => HashMap::new(),
        };
        Self { name: name.into(), args, id: None }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Outcome of one tool execution inside an Acting step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub call:       ToolCall,
    pub output:     String,      // "SUCCESS: ..." or "ERROR: ..."
    pub success:    bool,
    pub latency_ms: u64,
}

impl ToolResult {
    pub fn success(call: ToolCall, output: String, latency_ms: u64) -> Self {
        Self { call, output: format!("SUCCESS: {}", output), success: true, latency_ms }
    }

    pub fn failure(call: ToolCall, error: String, latency_ms: u64) -> Self {
        Self { call, output: format!("ERROR: {}", error), success: false, latency_ms }
    }
}

/// A completed tool invocation stored in history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step:        usize,
    pub tool:        ToolCall,
    pub observation: String,
    pub success:     bool,
}

/// Tracks token usage for a single LLM call or a whole run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens:  u32,
    pub output_tokens: u32,
    pub total_tokens:  u32,
}

impl TokenUsage {
    pub fn new(input: u32, output: u32) -> Self {
        Self {
            input_tokens:  input,
            output_tokens: output,
            total_tokens:  input + output,
        }
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// What the LLM can return. Always one of these two variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LlmResponse {
    /// LLM wants to invoke one or more tools before answering
    ToolCalls {
        tools: Vec<ToolCall>,
        usage: Option<TokenUsage>,
    },
    /// LLM produced a final answer; the run is complete
    FinalAnswer {
        content: String,
        usage:   Option<TokenUsage>,
    },
}

impl LlmResponse {
    pub fn tool(call: ToolCall) -> Self {
        Self::ToolCalls { tools: vec![call], usage: None }
    }

    pub fn answer(content: impl Into<String>) -> Self {
        Self::FinalAnswer { content: content.into(), usage: None }
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::ToolCalls { usage, .. } | Self::FinalAnswer { usage, .. } => *usage,
        }
    }
}

/// Speaker of a turn in a conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User      => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message of a conversation thread, replayed to the model on later turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role:    Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Configuration for the agent's planning behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard cap on number of planning cycles
    pub max_steps: usize,

    /// Minimum answer length in characters; shorter answers re-plan
    pub min_answer_length: usize,

    /// Model name passed to the LLM caller. Empty lets the caller decide.
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps:         12,
            min_answer_length: 1,
            model:             String::new(),
        }
    }
}
