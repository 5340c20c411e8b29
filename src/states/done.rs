use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::LlmCaller;
use async_trait::async_trait;

pub struct DoneState;

#[async_trait]
impl AgentState for DoneState {
    fn name(&self) -> &'static str { "Done" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        _tools: &ToolRegistry,
        _llm:   &dyn LlmCaller,
    ) -> Event {
        let summary = format!(
            "steps={} tool_calls={} tokens={}",
            memory.step, memory.history.len(), memory.total_usage.total_tokens
        );
        memory.log("Done", "TASK_COMPLETE", &summary);
        Event::start()  // Never used: the engine exits before re-entering
    }
}
