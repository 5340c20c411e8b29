//! The narrow capability the rest of the crate talks to: submit a prompt,
//! get text back, bounded by a step ceiling.

use std::sync::Arc;
use async_trait::async_trait;

use crate::builder::AgentBuilder;
use crate::error::AgentError;
use crate::llm::LlmCaller;
use crate::tools::ToolRegistry;
use crate::types::ChatTurn;

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Answers `prompt`, given the earlier turns of the conversation
    /// (empty for one-off prompts), in at most `max_steps` planning cycles.
    async fn ask(
        &self,
        transcript: &[ChatTurn],
        prompt:     &str,
        max_steps:  usize,
    ) -> Result<String, AgentError>;
}

/// [`Assistant`] backed by the ReAct state machine. Every call gets a fresh
/// engine; only the LLM caller and the tool registry are shared.
pub struct ReactAssistant {
    llm:           Arc<dyn LlmCaller>,
    tools:         Arc<ToolRegistry>,
    system_prompt: String,
    model:         String,
}

impl ReactAssistant {
    pub fn new(llm: Arc<dyn LlmCaller>, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools:         Arc::new(tools),
            system_prompt: String::new(),
            model:         String::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into(); self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into(); self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

#[async_trait]
impl Assistant for ReactAssistant {
    async fn ask(
        &self,
        transcript: &[ChatTurn],
        prompt:     &str,
        max_steps:  usize,
    ) -> Result<String, AgentError> {
        let mut engine = AgentBuilder::new(prompt)
            .system_prompt(self.system_prompt.clone())
            .transcript(transcript.to_vec())
            .llm(Arc::clone(&self.llm))
            .tools(Arc::clone(&self.tools))
            .model(self.model.clone())
            .max_steps(max_steps)
            .build()?;

        let result = engine.run().await;
        tracing::debug!(
            steps  = engine.memory.step,
            tools  = engine.memory.history.len(),
            tokens = engine.memory.total_usage.total_tokens,
            ok     = result.is_ok(),
            "assistant run finished"
        );
        result
    }
}
