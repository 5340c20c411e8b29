use std::sync::Mutex;
use crate::llm::LlmCaller;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::types::LlmResponse;
use async_trait::async_trait;

/// Scripted LLM for tests. Replays programmed results in order and
/// records every call.
pub struct MockLlmCaller {
    responses: Mutex<Vec<Result<LlmResponse, String>>>,
    call_log:  Mutex<Vec<(String, String)>>,  // (model, memory.prompt)
}

impl MockLlmCaller {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Like `new`, but individual calls may fail.
    pub fn with_results(results: Vec<Result<LlmResponse, String>>) -> Self {
        Self {
            responses: Mutex::new(results),
            call_log:  Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Returns the model string passed to the Nth call (0-indexed)
    pub fn model_for_call(&self, n: usize) -> Option<String> {
        self.call_log.lock().ok()?
            .get(n)
            .map(|(model, _)| model.clone())
    }

    /// Returns the prompt of the Nth call (0-indexed)
    pub fn prompt_for_call(&self, n: usize) -> Option<String> {
        self.call_log.lock().ok()?
            .get(n)
            .map(|(_, prompt)| prompt.clone())
    }
}

#[async_trait]
impl LlmCaller for MockLlmCaller {
    async fn call(
        &self,
        memory: &AgentMemory,
        _tools: &ToolRegistry,
        model:  &str,
    ) -> Result<LlmResponse, String> {
        self.call_log.lock().map_err(|e| e.to_string())?
            .push((model.to_string(), memory.prompt.clone()));

        let mut responses = self.responses.lock().map_err(|e| e.to_string())?;
        if responses.is_empty() {
            return Err("MockLlmCaller: no more programmed responses".to_string());
        }
        responses.remove(0)
    }
}
