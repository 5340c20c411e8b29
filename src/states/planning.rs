use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::LlmCaller;
use crate::types::{LlmResponse, ToolCall};
use async_trait::async_trait;

pub struct PlanningState;

impl PlanningState {
    fn handle_tool_calls(&self, memory: &mut AgentMemory, tools: Vec<ToolCall>) -> Event {
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        memory.log("Planning", "LLM_TOOL_CALL", &format!("tools={:?}", names));
        memory.pending_tool_calls = tools;
        Event::llm_tool_call()
    }

    fn handle_final_answer(&self, memory: &mut AgentMemory, content: String) -> Event {
        let len = content.trim().chars().count();
        if len < memory.config.min_answer_length {
            memory.log("Planning", "ANSWER_TOO_SHORT", &format!(
                "len={} min={}", len, memory.config.min_answer_length
            ));
            return Event::answer_too_short();
        }

        memory.log("Planning", "LLM_FINAL_ANSWER", &content.chars().take(100).collect::<String>());
        memory.final_answer = Some(content);
        Event::llm_final_answer()
    }
}

#[async_trait]
impl AgentState for PlanningState {
    fn name(&self) -> &'static str { "Planning" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        tools:  &ToolRegistry,
        llm:    &dyn LlmCaller,
    ) -> Event {
        // 1. Guard: max steps
        if memory.step >= memory.config.max_steps {
            memory.error = Some(format!("Max steps {} exceeded", memory.config.max_steps));
            memory.log("Planning", "MAX_STEPS", &format!("step={}", memory.step));
            return Event::max_steps();
        }

        // 2. Increment step
        memory.step += 1;
        memory.log("Planning", "STEP_START", &format!("step={}/{}", memory.step, memory.config.max_steps));

        // 3. Call LLM
        let model = memory.config.model.clone();
        let response = match llm.call(memory, tools, &model).await {
            Ok(r) => r,
            Err(err) => {
                memory.log("Planning", "LLM_ERROR", &err);
                memory.error = Some(format!("LLM error: {}", err));
                return Event::fatal_error();
            }
        };

        if let Some(usage) = response.usage() {
            memory.total_usage.add(usage);
        }

        match response {
            LlmResponse::ToolCalls { tools: calls, .. } if calls.is_empty() => {
                memory.error = Some("LLM requested an empty tool call list".to_string());
                memory.log("Planning", "LLM_ERROR", "empty tool call list");
                Event::fatal_error()
            }
            LlmResponse::ToolCalls { tools: calls, .. } => self.handle_tool_calls(memory, calls),
            LlmResponse::FinalAnswer { content, .. }    => self.handle_final_answer(memory, content),
        }
    }
}
