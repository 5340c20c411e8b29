//! Scheduled news digests.
//!
//! ```text
//! newsagent          # run daily at the configured times
//! newsagent --now    # collect once and exit
//! ```

use std::sync::Arc;
use std::time::Duration;
use anyhow::{bail, Context};

use newsagent::news::{build_notifier, collector, run_scheduler, Collector, ConfigStore, NewsPipeline, ReportWriter};
use newsagent::tools::{WebSearchConfig, WebSearchTool};
use newsagent::{ReactAssistant, Settings, ToolRegistry};

const POLL_INTERVAL: Duration = Duration::from_secs(60);

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    newsagent::telemetry::init("info");

    let mut run_now = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--now" => run_now = true,
            other   => bail!("unknown argument '{}'\nusage: newsagent [--now]", other),
        }
    }

    let settings = Settings::from_env().context("invalid environment settings")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(settings, run_now))
}

async fn run(settings: Settings, run_now: bool) -> anyhow::Result<()> {
    let pipeline = Arc::new(build_pipeline(&settings)?);

    let work = async {
        if run_now {
            pipeline.run_once().await.map(|outcome| {
                println!("Report saved to {}", outcome.report_path.display());
            })
        } else {
            run_scheduler(Arc::clone(&pipeline), POLL_INTERVAL).await
        }
    };

    tokio::select! {
        result = work => result.context("news agent stopped"),
        _ = tokio::signal::ctrl_c() => {
            println!("\nNews agent stopped. Goodbye!");
            Ok(())
        }
    }
}

fn build_pipeline(settings: &Settings) -> anyhow::Result<NewsPipeline> {
    let mut tools = ToolRegistry::new();
    tools.register(WebSearchTool::new(WebSearchConfig::default()).context("failed to build HTTP client")?);

    let assistant = ReactAssistant::new(settings.llm_caller(), tools)
        .with_system_prompt(collector::SYSTEM_PROMPT)
        .with_model(settings.model.clone());

    tracing::info!(
        config    = %settings.config_path.display(),
        output    = %settings.output_dir.display(),
        model     = %settings.model,
        transport = ?settings.mail.transport,
        "news agent configured"
    );

    Ok(NewsPipeline::new(
        ConfigStore::new(&settings.config_path),
        Collector::new(Arc::new(assistant), settings.max_steps),
        ReportWriter::new(&settings.output_dir),
        build_notifier(&settings.mail),
    ))
}
