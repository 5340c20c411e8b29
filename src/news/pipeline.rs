use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use chrono::Local;

use crate::error::NewsError;
use super::collector::Collector;
use super::config::ConfigStore;
use super::notify::Notifier;
use super::report::ReportWriter;
use super::schedule::{DailyScheduler, Job};

/// Result of one collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub report_path: PathBuf,
    /// `None` when mailing is off, otherwise whether the send succeeded.
    pub notified:    Option<bool>,
}

/// Config → collect → write → notify, wired once and run on demand.
pub struct NewsPipeline {
    config_store: ConfigStore,
    collector:    Collector,
    writer:       ReportWriter,
    notifier:     Arc<dyn Notifier>,
}

impl NewsPipeline {
    pub fn new(
        config_store: ConfigStore,
        collector:    Collector,
        writer:       ReportWriter,
        notifier:     Arc<dyn Notifier>,
    ) -> Self {
        Self { config_store, collector, writer, notifier }
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    /// The config file is re-read on every run so edits apply to the next firing.
    pub async fn run_collection(&self) -> Result<RunOutcome, NewsError> {
        tracing::info!(started_at = %Local::now().format("%Y-%m-%d %H:%M:%S"), "news collection started");

        let config = self.config_store.load()?;
        let language = config.language()?;

        let content = self.collector.collect(&config.topics, language).await;
        let saved = self.writer.save(&content)?;

        let notified = match config.email_recipient() {
            Some(to) => {
                let subject = format!("News Report - {}", Local::now().format("%Y/%m/%d %H:%M"));
                let sent = self.notifier.send(&subject, &saved.text, to).await;
                if !sent {
                    tracing::warn!(to, transport = self.notifier.transport(), "report was not emailed");
                }
                Some(sent)
            }
            None => None,
        };

        tracing::info!(
            report   = %saved.path.display(),
            topics   = config.topics.len(),
            notified = ?notified,
            "news collection finished"
        );
        Ok(RunOutcome { report_path: saved.path, notified })
    }

    /// Runs the pipeline a single time, ignoring the configured schedule.
    pub async fn run_once(&self) -> Result<RunOutcome, NewsError> {
        tracing::info!("running news collection once");
        self.run_collection().await
    }
}

/// Registers one daily job per configured time and polls forever.
///
/// The schedule is read once here; later edits to `schedule_times` need a
/// restart, while topic and email edits apply on the next run. Only a bad
/// config or time string at startup returns; failed runs are logged.
pub async fn run_scheduler(pipeline: Arc<NewsPipeline>, poll_interval: Duration) -> Result<(), NewsError> {
    let config = pipeline.config_store().load()?;

    tracing::info!(
        topics = ?config.topics,
        times  = ?config.schedule_times,
        email  = config.email_recipient().unwrap_or("disabled"),
        "news agent scheduler started"
    );

    let mut scheduler = DailyScheduler::new();
    for time in &config.schedule_times {
        let pipeline = Arc::clone(&pipeline);
        let job: Job = Box::new(move || {
            let pipeline = Arc::clone(&pipeline);
            Box::pin(async move {
                if let Err(e) = pipeline.run_collection().await {
                    tracing::error!(error = %e, "scheduled news collection failed");
                }
            })
        });
        scheduler.every_day_at(time, job)?;
    }

    if scheduler.is_empty() {
        tracing::warn!("no schedule_times configured; nothing will run");
    }

    loop {
        scheduler.run_pending().await;
        tokio::time::sleep(poll_interval).await;
    }
}
