use std::collections::HashMap;
use std::sync::Arc;
use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::LlmCaller;
use crate::transitions::TransitionTable;
use crate::trace::Trace;
use crate::types::State;
use crate::error::AgentError;

pub struct AgentEngine {
    pub memory:  AgentMemory,
    pub tools:   Arc<ToolRegistry>,
    pub llm:     Arc<dyn LlmCaller>,
    state:       State,
    transitions: TransitionTable,
    handlers:    HashMap<&'static str, Box<dyn AgentState>>,
}

impl AgentEngine {
    /// Creates a new engine. Prefer using AgentBuilder for ergonomic construction.
    pub fn new(
        memory:      AgentMemory,
        tools:       Arc<ToolRegistry>,
        llm:         Arc<dyn LlmCaller>,
        transitions: TransitionTable,
        handlers:    HashMap<&'static str, Box<dyn AgentState>>,
    ) -> Self {
        Self {
            memory,
            tools,
            llm,
            state: State::idle(),
            transitions,
            handlers,
        }
    }

    /// Run the agent to completion.
    /// Returns Ok(final_answer) or Err(AgentError).
    pub async fn run(&mut self) -> Result<String, AgentError> {
        // Every planning cycle takes at most three transitions.
        let safety_cap = self.memory.config.max_steps * 3 + 3;
        let mut iterations = 0;

        while !self.state.is_terminal() {
            iterations += 1;
            if iterations > safety_cap {
                return Err(AgentError::SafetyCapExceeded(iterations));
            }
            self.step().await?;
        }

        // Terminal handlers only record bookkeeping; their event is ignored.
        if let Some(handler) = self.handlers.get(self.state.as_str()) {
            handler.handle(&mut self.memory, &self.tools, self.llm.as_ref()).await;
        }

        if self.state == State::done() {
            Ok(self.memory.final_answer.clone()
                .unwrap_or_else(|| "[No answer produced]".to_string()))
        } else {
            Err(AgentError::AgentFailed(
                self.memory.error.clone()
                    .unwrap_or_else(|| "Unknown error".to_string())
            ))
        }
    }

    /// Executes a single state transition.
    pub async fn step(&mut self) -> Result<(), AgentError> {
        let handler = self.handlers.get(self.state.as_str())
            .ok_or_else(|| AgentError::NoHandlerForState(self.state.to_string()))?;

        let event: Event = handler.handle(&mut self.memory, &self.tools, self.llm.as_ref()).await;

        let next_state = self.transitions.get(&(self.state.clone(), event.clone()))
            .cloned()
            .ok_or_else(|| AgentError::InvalidTransition {
                from:  self.state.clone(),
                event: event.clone(),
            })?;

        tracing::debug!(from = %self.state, event = %event, to = %next_state, "transition");
        self.state = next_state;
        Ok(())
    }

    pub fn trace(&self) -> &Trace {
        &self.memory.trace
    }

    pub fn current_state(&self) -> &State {
        &self.state
    }
}
