//! Process settings read from the environment.
//!
//! Binaries call `dotenvy::dotenv()` first, so a `.env` file in the working
//! directory can supply any of these. Everything has a default except the
//! provider credentials.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SettingsError;
use crate::llm::{LlmCaller, OpenAiCaller};
use crate::news::notify::RESEND_DEFAULT_FROM;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_OUTPUT_DIR: &str = "news_reports";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_STEPS: usize = 12;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_SANDBOX_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_THREAD_ID: &str = "main_conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    Resend,
    Smtp,
}

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub transport:      MailTransport,
    pub resend_api_key: Option<Secret>,
    pub resend_from:    String,
    pub smtp_host:      String,
    pub smtp_address:   Option<String>,
    pub smtp_password:  Option<Secret>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_path:     PathBuf,
    pub output_dir:      PathBuf,
    pub model:           String,
    /// OpenAI-compatible endpoint; `None` uses the client's default.
    pub openai_base_url: Option<String>,
    pub openai_api_key:  Option<Secret>,
    pub max_steps:       usize,
    pub mail:            MailSettings,
    /// `None` when code execution is switched off.
    pub interpreter:     Option<String>,
    pub sandbox_timeout: Duration,
    /// Directory for persisted chat threads; in-memory when unset.
    pub thread_dir:      Option<PathBuf>,
    pub thread_id:       String,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let transport = match get("NEWSAGENT_MAIL_TRANSPORT").map(|v| v.to_lowercase()) {
            None => MailTransport::Resend,
            Some(v) if v == "resend" => MailTransport::Resend,
            Some(v) if v == "smtp" => MailTransport::Smtp,
            Some(v) => return Err(SettingsError::Invalid {
                key:      "NEWSAGENT_MAIL_TRANSPORT",
                expected: "'resend' or 'smtp'",
                value:    v,
            }),
        };

        let max_steps = match get("NEWSAGENT_MAX_STEPS") {
            None => DEFAULT_MAX_STEPS,
            Some(v) => v.parse::<usize>().ok().filter(|n| *n > 0).ok_or(SettingsError::Invalid {
                key:      "NEWSAGENT_MAX_STEPS",
                expected: "a positive integer",
                value:    v,
            })?,
        };

        let timeout_secs = match get("NEWSAGENT_SANDBOX_TIMEOUT_SECS") {
            None => DEFAULT_SANDBOX_TIMEOUT_SECS,
            Some(v) => v.parse::<u64>().ok().filter(|n| *n > 0).ok_or(SettingsError::Invalid {
                key:      "NEWSAGENT_SANDBOX_TIMEOUT_SECS",
                expected: "a positive number of seconds",
                value:    v,
            })?,
        };

        let interpreter = match get("NEWSAGENT_SANDBOX_INTERPRETER") {
            Some(v) if matches!(v.to_lowercase().as_str(), "off" | "none" | "disabled") => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_INTERPRETER.to_string()),
        };

        Ok(Self {
            config_path:     PathBuf::from(or("NEWSAGENT_CONFIG", DEFAULT_CONFIG_PATH)),
            output_dir:      PathBuf::from(or("NEWSAGENT_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            model:           or("OPENAI_MODEL", DEFAULT_MODEL),
            openai_base_url: get("OPENAI_BASE_URL"),
            openai_api_key:  get("OPENAI_API_KEY").map(Secret),
            max_steps,
            mail: MailSettings {
                transport,
                resend_api_key: get("RESEND_API_KEY").map(Secret),
                resend_from:    or("RESEND_FROM", RESEND_DEFAULT_FROM),
                smtp_host:      or("SMTP_HOST", DEFAULT_SMTP_HOST),
                smtp_address:   get("GMAIL_ADDRESS"),
                smtp_password:  get("GMAIL_APP_PASSWORD").map(Secret),
            },
            interpreter,
            sandbox_timeout: Duration::from_secs(timeout_secs),
            thread_dir:      get("NEWSAGENT_THREAD_DIR").map(PathBuf::from),
            thread_id:       or("NEWSAGENT_THREAD_ID", DEFAULT_THREAD_ID),
        })
    }

    /// OpenAI client for the configured endpoint. Without a base URL the
    /// client reads `OPENAI_API_KEY` itself.
    pub fn llm_caller(&self) -> Arc<dyn LlmCaller> {
        match &self.openai_base_url {
            Some(base) => Arc::new(OpenAiCaller::with_base_url(
                base.clone(),
                self.openai_api_key.as_ref().map(|k| k.expose().to_string()).unwrap_or_default(),
            )),
            None => Arc::new(OpenAiCaller::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, SettingsError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.config_path, PathBuf::from("config.json"));
        assert_eq!(s.output_dir, PathBuf::from("news_reports"));
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.max_steps, 12);
        assert_eq!(s.mail.transport, MailTransport::Resend);
        assert_eq!(s.mail.resend_api_key, None);
        assert_eq!(s.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(s.interpreter.as_deref(), Some("python3"));
        assert_eq!(s.sandbox_timeout, Duration::from_secs(10));
        assert_eq!(s.thread_dir, None);
        assert_eq!(s.thread_id, "main_conversation");
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(&[
            ("NEWSAGENT_MAIL_TRANSPORT", "SMTP"),
            ("GMAIL_ADDRESS", "me@example.com"),
            ("GMAIL_APP_PASSWORD", "abcd efgh"),
            ("NEWSAGENT_MAX_STEPS", "4"),
            ("NEWSAGENT_SANDBOX_INTERPRETER", "off"),
            ("NEWSAGENT_THREAD_DIR", "/tmp/threads"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
        ]).unwrap();

        assert_eq!(s.mail.transport, MailTransport::Smtp);
        assert_eq!(s.mail.smtp_address.as_deref(), Some("me@example.com"));
        assert_eq!(s.max_steps, 4);
        assert_eq!(s.interpreter, None);
        assert_eq!(s.thread_dir, Some(PathBuf::from("/tmp/threads")));
        assert_eq!(s.openai_base_url.as_deref(), Some("http://localhost:11434/v1"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let s = settings(&[("RESEND_API_KEY", "   "), ("OPENAI_MODEL", "")]).unwrap();
        assert_eq!(s.mail.resend_api_key, None);
        assert_eq!(s.model, "gpt-4o-mini");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            settings(&[("NEWSAGENT_MAIL_TRANSPORT", "pigeon")]),
            Err(SettingsError::Invalid { key: "NEWSAGENT_MAIL_TRANSPORT", .. })
        ));
        assert!(settings(&[("NEWSAGENT_MAX_STEPS", "0")]).is_err());
        assert!(settings(&[("NEWSAGENT_SANDBOX_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let s = settings(&[("RESEND_API_KEY", "re_secret"), ("GMAIL_APP_PASSWORD", "pw123")]).unwrap();
        let shown = format!("{:?}", s);
        assert!(!shown.contains("re_secret"));
        assert!(!shown.contains("pw123"));
    }
}
