use std::collections::HashMap;
use std::sync::Arc;
use crate::engine::AgentEngine;
use crate::error::AgentError;
use crate::memory::AgentMemory;
use crate::tools::{Tool, ToolRegistry};
use crate::llm::LlmCaller;
use crate::states::{
    AgentState, IdleState, PlanningState, ActingState,
    ObservingState, DoneState, ErrorState,
};
use crate::transitions::build_transition_table;
use crate::types::ChatTurn;

/// Assembles an [`AgentEngine`] for a single prompt.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use newsagent::{AgentBuilder, llm::OpenAiCaller};
/// # async fn demo() -> Result<(), newsagent::AgentError> {
/// let _answer = AgentBuilder::new("What happened in Tokyo today?")
///     .system_prompt("Answer in one paragraph.")
///     .llm(Arc::new(OpenAiCaller::new()))
///     .max_steps(5)
///     .build()?
///     .run()
///     .await?;
/// # Ok(()) }
/// ```
pub struct AgentBuilder {
    memory:       AgentMemory,
    tools:        Option<Arc<ToolRegistry>>,
    extra_tools:  ToolRegistry,
    llm:          Option<Arc<dyn LlmCaller>>,
}

impl AgentBuilder {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            memory:      AgentMemory::new(prompt),
            tools:       None,
            extra_tools: ToolRegistry::new(),
            llm:         None,
        }
    }

    pub fn system_prompt(mut self, p: impl Into<String>) -> Self {
        self.memory.system_prompt = p.into(); self
    }

    pub fn transcript(mut self, turns: Vec<ChatTurn>) -> Self {
        self.memory.transcript = turns; self
    }

    pub fn llm(mut self, llm: Arc<dyn LlmCaller>) -> Self {
        self.llm = Some(llm); self
    }

    pub fn max_steps(mut self, n: usize) -> Self {
        self.memory.config.max_steps = n; self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.memory.config.model = model.into(); self
    }

    /// Shares an already-built registry between many runs.
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools); self
    }

    /// Adds a single tool. Ignored if `tools()` supplied a shared registry.
    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.extra_tools.register(tool); self
    }

    /// Builds the AgentEngine with one handler per ReAct state.
    pub fn build(self) -> Result<AgentEngine, AgentError> {
        let llm = self.llm
            .ok_or_else(|| AgentError::BuildError("LLM caller is required".to_string()))?;

        if self.memory.config.max_steps == 0 {
            return Err(AgentError::BuildError("max_steps must be at least 1".to_string()));
        }

        let tools = self.tools.unwrap_or_else(|| Arc::new(self.extra_tools));

        let handlers: HashMap<&'static str, Box<dyn AgentState>> = default_handlers()
            .into_iter()
            .map(|handler| (handler.name(), handler))
            .collect();

        Ok(AgentEngine::new(
            self.memory,
            tools,
            llm,
            build_transition_table(),
            handlers,
        ))
    }
}

fn default_handlers() -> Vec<Box<dyn AgentState>> {
    vec![
        Box::new(IdleState),
        Box::new(PlanningState),
        Box::new(ActingState),
        Box::new(ObservingState),
        Box::new(DoneState),
        Box::new(ErrorState),
    ]
}
