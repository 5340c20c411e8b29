use std::path::PathBuf;
use thiserror::Error;
use crate::types::State;
use crate::events::Event;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent failed: {0}")]
    AgentFailed(String),

    #[error("Invalid transition: {from} + {event} not in transition table")]
    InvalidTransition { from: State, event: Event },

    #[error("No handler registered for state: {0}")]
    NoHandlerForState(String),

    #[error("Safety cap exceeded after {0} iterations")]
    SafetyCapExceeded(usize),

    #[error("Build error: {0}")]
    BuildError(String),
}

/// Reading or creating the news configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid JSON: {source}")]
    Parse {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config key `{0}` is missing")]
    MissingKey(&'static str),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Process settings taken from the environment.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key:      &'static str,
        expected: &'static str,
        value:    String,
    },
}

/// Failure of one news collection run.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("failed to write report {path}: {source}")]
    Report {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}
