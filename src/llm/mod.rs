use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::types::LlmResponse;
use async_trait::async_trait;

mod openai;
mod mock;

pub use openai::OpenAiCaller;
pub use mock::MockLlmCaller;

/// Turns the current [`AgentMemory`] into one model decision.
///
/// Implementations send `memory.build_messages()` together with every schema
/// from `tools.schemas()`, and classify the reply as tool calls or a final
/// answer. `Err` is reserved for failures the run cannot recover from
/// (transport, authentication, an unreadable reply); the Planning state turns
/// it into the Error state.
#[async_trait]
pub trait LlmCaller: Send + Sync {
    async fn call(
        &self,
        memory: &AgentMemory,
        tools:  &ToolRegistry,
        model:  &str,
    ) -> Result<LlmResponse, String>;
}
