//! The scheduled news job: configuration, collection, reports and delivery.

pub mod collector;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod schedule;

pub use collector::Collector;
pub use config::{ConfigStore, EmailSettings, NewsConfig};
pub use notify::{build_notifier, Notifier, ResendNotifier, SmtpCredentials, SmtpNotifier};
pub use pipeline::{run_scheduler, NewsPipeline, RunOutcome};
pub use report::{ReportWriter, SavedReport};
pub use schedule::DailyScheduler;
