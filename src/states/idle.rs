use crate::states::AgentState;
use crate::events::Event;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::llm::LlmCaller;
use async_trait::async_trait;

pub struct IdleState;

#[async_trait]
impl AgentState for IdleState {
    fn name(&self) -> &'static str { "Idle" }

    async fn handle(
        &self,
        memory: &mut AgentMemory,
        tools:  &ToolRegistry,
        _llm:   &dyn LlmCaller,
    ) -> Event {
        let prompt: String = memory.prompt.chars().take(80).collect();
        memory.log("Idle", "AGENT_STARTED", &format!(
            "prompt='{}' turns={} tools={} max_steps={}",
            prompt, memory.transcript.len(), tools.len(), memory.config.max_steps
        ));
        Event::start()
    }
}
