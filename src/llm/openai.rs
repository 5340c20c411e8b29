use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall,
        ChatCompletionRequestMessage,
        ChatCompletionTool,
        ChatCompletionToolType,
        CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use crate::llm::LlmCaller;
use crate::memory::AgentMemory;
use crate::tools::ToolRegistry;
use crate::types::{LlmResponse, TokenUsage, ToolCall};
use std::collections::HashMap;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

// Deterministic output for summaries.
const TEMPERATURE: f32 = 0.0;

pub struct OpenAiCaller {
    client: Client<OpenAIConfig>,
}

impl OpenAiCaller {
    /// Standard OpenAI client using the OPENAI_API_KEY env var
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Any OpenAI-compatible endpoint (Groq, Ollama, a local proxy).
    /// api_base example: "https://api.groq.com/openai/v1"
    pub fn with_base_url(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self { client: Client::with_config(config) }
    }

    fn build_tools(tools: &ToolRegistry) -> Vec<ChatCompletionTool> {
        tools.schemas().into_iter().map(|schema| {
            ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name:        schema.name,
                    description: Some(schema.description),
                    parameters:  Some(schema.input_schema),
                },
            }
        }).collect()
    }

    fn parse_tool_call(tc: &ChatCompletionMessageToolCall) -> Result<ToolCall, String> {
        let args: HashMap<String, serde_json::Value> = if tc.function.arguments.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&tc.function.arguments)
                .map_err(|e| format!("Failed to parse tool args: {}", e))?
        };
        Ok(ToolCall {
            name: tc.function.name.clone(),
            args,
            id:   Some(tc.id.clone()),
        })
    }
}

impl Default for OpenAiCaller {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl LlmCaller for OpenAiCaller {
    async fn call(
        &self,
        memory: &AgentMemory,
        tools:  &ToolRegistry,
        model:  &str,
    ) -> Result<LlmResponse, String> {
        // Messages are built as JSON and converted through serde into
        // async-openai's typed request messages.
        let messages: Vec<ChatCompletionRequestMessage> =
            serde_json::from_value(serde_json::Value::Array(memory.build_messages()))
                .map_err(|e| format!("Failed to build messages: {}", e))?;

        let model = if model.is_empty() { DEFAULT_MODEL } else { model };
        let oai_tools = Self::build_tools(tools);

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(model)
            .messages(messages)
            .temperature(TEMPERATURE);

        if !oai_tools.is_empty() {
            request_builder.tools(oai_tools);
        }

        let request = request_builder.build()
            .map_err(|e| format!("Failed to build request: {}", e))?;

        let response = self.client.chat()
            .create(request)
            .await
            .map_err(|e| format!("OpenAI API error: {}", e))?;

        let usage = response.usage.map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let choice = response.choices.into_iter().next()
            .ok_or("Empty response from OpenAI")?;
        let message = choice.message;

        // Tool calls take priority over text content
        if let Some(tool_calls) = message.tool_calls.filter(|calls| !calls.is_empty()) {
            let tools = tool_calls.iter()
                .map(Self::parse_tool_call)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(LlmResponse::ToolCalls { tools, usage });
        }

        let content = message.content
            .ok_or("No content in OpenAI response")?;

        Ok(LlmResponse::FinalAnswer { content, usage })
    }
}
