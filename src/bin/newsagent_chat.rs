//! Interactive assistant with web search, sandboxed code execution and
//! conversation memory.

use std::sync::Arc;
use anyhow::Context;
use tokio::io::BufReader;

use newsagent::chat::{self, ChatSession};
use newsagent::tools::{CodeExecutorTool, DisabledSandbox, ProcessSandbox, Sandbox, WebSearchConfig, WebSearchTool};
use newsagent::{FileThreadStore, MemoryThreadStore, ReactAssistant, Settings, ThreadStore, ToolRegistry};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    // Quiet by default so log lines don't interleave with the prompt.
    newsagent::telemetry::init("warn");

    let settings = Settings::from_env().context("invalid environment settings")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(settings))
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let sandbox: Arc<dyn Sandbox> = match &settings.interpreter {
        Some(program) => Arc::new(ProcessSandbox::python(program.clone()).with_timeout(settings.sandbox_timeout)),
        None          => Arc::new(DisabledSandbox),
    };

    let mut tools = ToolRegistry::new();
    tools.register(WebSearchTool::new(WebSearchConfig::default()).context("failed to build HTTP client")?);
    tools.register(CodeExecutorTool::new(sandbox));

    let assistant = ReactAssistant::new(settings.llm_caller(), tools)
        .with_system_prompt(chat::SYSTEM_PROMPT)
        .with_model(settings.model.clone());

    let store: Arc<dyn ThreadStore> = match &settings.thread_dir {
        Some(dir) => Arc::new(FileThreadStore::new(dir).map_err(anyhow::Error::msg)?),
        None      => Arc::new(MemoryThreadStore::new()),
    };

    let session = ChatSession::new(Arc::new(assistant), store, settings.thread_id.clone(), settings.max_steps);
    let stdin = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = session.run(stdin, tokio::io::stdout()) => result.context("chat session failed"),
        _ = tokio::signal::ctrl_c() => {
            println!("\n\nGoodbye!");
            Ok(())
        }
    }
}
