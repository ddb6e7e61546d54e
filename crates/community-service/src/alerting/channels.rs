//! Alert channels: console block, webhook POST, and an email port

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use community_common::AlertsConfig;
use community_core::{AlertChannelKind, Severity};
use tracing::{error, info, warn};

use super::entry::AlertPayload;

/// Fixed `User-Agent` of outbound alert webhooks
pub const ALERT_USER_AGENT: &str = concat!("community-alerts/", env!("CARGO_PKG_VERSION"));

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Alert delivery errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook responded with status {0}")]
    Status(u16),

    #[error("Mailer error: {0}")]
    Mailer(String),
}

/// A destination alerts can be delivered to
#[async_trait]
pub trait AlertChannel: Send + Sync {
    fn kind(&self) -> AlertChannelKind;

    /// Deliver one alert. `config` is the dispatcher's snapshot at send time.
    async fn send(&self, payload: &AlertPayload, config: &AlertsConfig) -> Result<(), AlertError>;
}

/// Human-readable, delimited block shared by the console and email channels
pub(crate) fn render_block(payload: &AlertPayload) -> String {
    let rule = "=".repeat(64);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "ALERT [{}]", payload.severity.as_str().to_uppercase());
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Code:        {}", payload.code);
    let _ = writeln!(out, "Message:     {}", payload.message);
    let _ = writeln!(out, "Time:        {}", payload.timestamp.to_rfc3339());
    let _ = writeln!(out, "Environment: {}", payload.environment);
    if let Some(request_id) = &payload.request_id {
        let _ = writeln!(out, "Request ID:  {request_id}");
    }
    if let Some(user_id) = payload.user_id {
        let _ = writeln!(out, "User ID:     {user_id}");
    }
    if let (Some(method), Some(endpoint)) = (&payload.method, &payload.endpoint) {
        let _ = writeln!(out, "Endpoint:    {method} {endpoint}");
    }
    if let Some(err) = &payload.error {
        let _ = writeln!(out, "Error:       {err}");
    }
    if let Some(context) = &payload.context {
        let _ = writeln!(out, "Context:     {context}");
    }
    let _ = write!(out, "{rule}");
    out
}

// ============================================================================
// Console
// ============================================================================

/// Prints a delimited block through the log sink. The default fallback channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleChannel;

#[async_trait]
impl AlertChannel for ConsoleChannel {
    fn kind(&self) -> AlertChannelKind {
        AlertChannelKind::Console
    }

    async fn send(&self, payload: &AlertPayload, _config: &AlertsConfig) -> Result<(), AlertError> {
        let block = render_block(payload);
        match payload.severity {
            Severity::Critical | Severity::Error => error!(target: "alerts", "\n{block}"),
            Severity::Warning => warn!(target: "alerts", "\n{block}"),
            Severity::Info => info!(target: "alerts", "\n{block}"),
        }
        Ok(())
    }
}

// ============================================================================
// Webhook
// ============================================================================

/// Single JSON POST to the configured webhook URL. No retry.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(ALERT_USER_AGENT)
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client for alert webhooks");
                reqwest::Client::new()
            });
        Self { client }
    }
}

impl Default for WebhookChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    fn kind(&self) -> AlertChannelKind {
        AlertChannelKind::Webhook
    }

    async fn send(&self, payload: &AlertPayload, config: &AlertsConfig) -> Result<(), AlertError> {
        let url = config
            .webhook_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(AlertError::NotConfigured("webhook url"))?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::USER_AGENT, ALERT_USER_AGENT)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::Status(status.as_u16()));
        }
        Ok(())
    }
}

// ============================================================================
// Email
// ============================================================================

/// Outbound mail provider
#[async_trait]
pub trait AlertMailer: Send + Sync {
    async fn send(&self, recipients: &[String], subject: &str, body: &str)
        -> Result<(), AlertError>;
}

/// Mailer that only writes the message to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl AlertMailer for LogMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), AlertError> {
        info!(
            target: "alerts",
            recipients = %recipients.join(","),
            subject,
            "Alert email (no mail provider configured)\n{body}"
        );
        Ok(())
    }
}

/// Sends the alert block to the configured recipients through an [`AlertMailer`]
#[derive(Clone)]
pub struct EmailChannel {
    mailer: Arc<dyn AlertMailer>,
}

impl EmailChannel {
    pub fn new(mailer: Arc<dyn AlertMailer>) -> Self {
        Self { mailer }
    }
}

impl Default for EmailChannel {
    fn default() -> Self {
        Self::new(Arc::new(LogMailer))
    }
}

impl std::fmt::Debug for EmailChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailChannel").finish_non_exhaustive()
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn kind(&self) -> AlertChannelKind {
        AlertChannelKind::Email
    }

    async fn send(&self, payload: &AlertPayload, config: &AlertsConfig) -> Result<(), AlertError> {
        if config.email_recipients.is_empty() {
            return Err(AlertError::NotConfigured("email recipients"));
        }
        self.mailer
            .send(
                &config.email_recipients,
                &payload.subject(),
                &render_block(payload),
            )
            .await
    }
}
