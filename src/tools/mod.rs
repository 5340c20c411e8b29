use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Value;

mod code_exec;
mod web_search;

pub use code_exec::{CodeExecutorTool, DisabledSandbox, ProcessSandbox, Sandbox, SandboxOutput};
pub use web_search::{WebSearchConfig, WebSearchTool};

/// Something the model can call.
///
/// Failures are returned as `Err(message)` and become an `ERROR:`
/// observation for the model; they never abort the agent run.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Clear description of what this tool does and when to use it.
    fn description(&self) -> &str;

    /// JSON Schema for the input parameters.
    fn parameters(&self) -> Value;

    async fn call(&self, args: &HashMap<String, Value>) -> Result<String, String>;
}

/// Tool schema for sending to the LLM (OpenAI tool format)
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolSchema {
    pub name:         String,
    pub description:  String,
    pub input_schema: Value,
}

/// Closure-backed tool, handy for tests and one-off helpers.
pub struct FnTool<F> {
    name:        String,
    description: String,
    schema:      Value,
    func:        F,
}

impl<F> FnTool<F>
where
    F: Fn(&HashMap<String, Value>) -> Result<String, String> + Send + Sync,
{
    pub fn new(
        name:        impl Into<String>,
        description: impl Into<String>,
        schema:      Value,
        func:        F,
    ) -> Self {
        Self { name: name.into(), description: description.into(), schema, func }
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(&HashMap<String, Value>) -> Result<String, String> + Send + Sync,
{
    fn name(&self) -> &str { &self.name }

    fn description(&self) -> &str { &self.description }

    fn parameters(&self) -> Value { self.schema.clone() }

    async fn call(&self, args: &HashMap<String, Value>) -> Result<String, String> {
        (self.func)(args)
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Registers a tool under its own name, replacing any previous tool
    /// with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Execute a named tool with given arguments.
    /// Unknown tools are reported as `Err`, never a panic.
    pub async fn execute(&self, name: &str, args: &HashMap<String, Value>) -> Result<String, String> {
        match self.tools.get(name) {
            Some(tool) => tool.call(args).await,
            None       => Err(format!("Tool '{}' not found in registry", name)),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns all tool schemas, sorted by name so requests are stable.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| ToolSchema {
            name:         t.name().to_string(),
            description:  t.description().to_string(),
            input_schema: t.parameters(),
        }).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Reads a required string argument.
pub(crate) fn required_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string argument `{}`", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_tool() -> FnTool<impl Fn(&HashMap<String, Value>) -> Result<String, String> + Send + Sync> {
        FnTool::new("echo", "Echo the text back", json!({ "type": "object" }), |args| {
            required_str(args, "text").map(str::to_string)
        })
    }

    #[tokio::test]
    async fn executes_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool());

        let args: HashMap<String, Value> = [("text".to_string(), json!("hi"))].into();
        assert_eq!(registry.execute("echo", &args).await, Ok("hi".to_string()));
        assert!(registry.execute("echo", &HashMap::new()).await.is_err());
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_value() {
        let registry = ToolRegistry::new();
        let err = registry.execute("missing", &HashMap::new()).await.unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn schemas_are_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(FnTool::new("zeta", "z", json!({}), |_| Ok(String::new())));
        registry.register(FnTool::new("alpha", "a", json!({}), |_| Ok(String::new())));
        let names: Vec<_> = registry.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
