pub mod types;
pub mod memory;
pub mod events;
pub mod transitions;
pub mod tools;
pub mod engine;
pub mod trace;
pub mod error;
pub mod builder;
pub mod states;
pub mod llm;
pub mod assistant;
pub mod thread;
pub mod chat;
pub mod news;
pub mod settings;
pub mod telemetry;

// Convenience re-exports at crate root
pub use builder::AgentBuilder;
pub use engine::AgentEngine;
pub use memory::AgentMemory;
pub use types::{State, LlmResponse, ToolCall, ToolResult, HistoryEntry, AgentConfig, ChatTurn, Role};
pub use events::Event;
pub use tools::{ToolRegistry, FnTool, Tool};
pub use llm::{LlmCaller, OpenAiCaller, MockLlmCaller};
pub use assistant::{Assistant, ReactAssistant};
pub use thread::{ThreadStore, MemoryThreadStore, FileThreadStore};
pub use chat::{ChatSession, ChatReply};
pub use trace::{TraceEntry, Trace};
pub use settings::Settings;
pub use error::{AgentError, ConfigError, NewsError, ScheduleError, SettingsError};
