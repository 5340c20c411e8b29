//! Email delivery of finished reports.
//!
//! Two transports share one contract: missing credentials or a provider
//! failure is logged and reported as `false`, never raised, retried or
//! queued. Credentials are handed over at construction time.

use std::sync::Arc;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;

use crate::settings::{MailSettings, MailTransport};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short transport name for logs.
    fn transport(&self) -> &'static str;

    /// Returns whether the provider accepted the message.
    async fn send(&self, subject: &str, body: &str, to: &str) -> bool;
}

/// Builds the transport selected for this deployment.
pub fn build_notifier(mail: &MailSettings) -> Arc<dyn Notifier> {
    match mail.transport {
        MailTransport::Resend => {
            let api_key = mail.resend_api_key.as_ref().map(|k| k.expose().to_string());
            Arc::new(ResendNotifier::new(api_key).with_from(mail.resend_from.clone()))
        }
        MailTransport::Smtp => {
            let credentials = match (&mail.smtp_address, &mail.smtp_password) {
                (Some(address), Some(password)) => Some(SmtpCredentials {
                    address:      address.clone(),
                    app_password: password.expose().to_string(),
                }),
                _ => None,
            };
            Arc::new(SmtpNotifier::new(mail.smtp_host.clone(), credentials))
        }
    }
}

// ── Resend HTTP API ──────────────────────────────────────

pub const RESEND_BASE_URL: &str = "https://api.resend.com";
pub const RESEND_DEFAULT_FROM: &str = "News Agent <onboarding@resend.dev>";

pub struct ResendNotifier {
    http:     reqwest::Client,
    api_key:  Option<String>,
    from:     String,
    base_url: String,
}

impl ResendNotifier {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http:     reqwest::Client::new(),
            api_key:  api_key.filter(|k| !k.trim().is_empty()),
            from:     RESEND_DEFAULT_FROM.to_string(),
            base_url: RESEND_BASE_URL.to_string(),
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into(); self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into(); self
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    fn transport(&self) -> &'static str { "resend" }

    async fn send(&self, subject: &str, body: &str, to: &str) -> bool {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(
                "RESEND_API_KEY is not set; skipping email. Create an account at \
                 https://resend.com, issue an API key and add RESEND_API_KEY=re_... to .env"
            );
            return false;
        };

        let payload = json!({
            "from":    self.from,
            "to":      [to],
            "subject": subject,
            "text":    body,
        });

        let response = self.http
            .post(format!("{}/emails", self.base_url.trim_end_matches('/')))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(to, transport = "resend", "email sent");
                true
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                tracing::error!(to, %status, detail, "email provider rejected the message");
                false
            }
            Err(e) => {
                tracing::error!(to, error = %e, "email request failed");
                false
            }
        }
    }
}

// ── Direct SMTP ──────────────────────────────────────────

#[derive(Clone)]
pub struct SmtpCredentials {
    pub address:      String,
    pub app_password: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("address", &self.address)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

pub struct SmtpNotifier {
    host:        String,
    credentials: Option<SmtpCredentials>,
}

impl SmtpNotifier {
    pub fn new(host: impl Into<String>, credentials: Option<SmtpCredentials>) -> Self {
        Self { host: host.into(), credentials }
    }

    fn build_message(from: &str, to: &str, subject: &str, body: &str) -> Result<Message, String> {
        let from: Mailbox = from.parse().map_err(|e| format!("invalid sender address: {}", e))?;
        let to: Mailbox = to.parse().map_err(|e| format!("invalid recipient address: {}", e))?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| format!("failed to build message: {}", e))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn transport(&self) -> &'static str { "smtp" }

    async fn send(&self, subject: &str, body: &str, to: &str) -> bool {
        let Some(creds) = self.credentials.as_ref() else {
            tracing::warn!(
                "GMAIL_ADDRESS / GMAIL_APP_PASSWORD are not set; skipping email. \
                 Create an app password for the sending account and add both to .env"
            );
            return false;
        };

        let message = match Self::build_message(&creds.address, to, subject, body) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(to, error = %e, "email not sent");
                return false;
            }
        };

        let mailer = match AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host) {
            Ok(builder) => builder
                .credentials(Credentials::new(creds.address.clone(), creds.app_password.clone()))
                .build(),
            Err(e) => {
                tracing::error!(host = %self.host, error = %e, "invalid SMTP relay");
                return false;
            }
        };

        match mailer.send(message).await {
            Ok(_) => {
                tracing::info!(to, transport = "smtp", "email sent");
                true
            }
            Err(e) => {
                tracing::error!(to, error = %e, "SMTP delivery failed");
                false
            }
        }
    }
}
