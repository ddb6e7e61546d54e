//! Alert dispatcher - threshold check and concurrent fan-out

use std::collections::HashMap;
use std::sync::Arc;

use community_common::{AlertsConfig, Environment};
use community_core::{AlertChannelKind, Severity};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::channels::{AlertChannel, ConsoleChannel, EmailChannel, WebhookChannel};
use super::entry::{AlertPayload, ErrorLogEntry};

/// Partial runtime update of the alert configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsConfigUpdate {
    pub enabled: Option<bool>,
    pub channels: Option<Vec<AlertChannelKind>>,
    pub email_recipients: Option<Vec<String>>,
    /// `Some(None)` clears the URL
    #[serde(default, deserialize_with = "deserialize_some")]
    pub webhook_url: Option<Option<String>>,
    pub min_severity: Option<Severity>,
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Outcome of one `send_alert` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<AlertChannelKind>,
    pub failed: Vec<AlertChannelKind>,
}

impl DispatchReport {
    /// Nothing was attempted (disabled, below threshold, or no channels)
    pub fn is_skipped(&self) -> bool {
        self.delivered.is_empty() && self.failed.is_empty()
    }
}

/// Routes error entries to alert channels.
///
/// Constructed once per process and shared through the service context.
pub struct AlertDispatcher {
    config: RwLock<AlertsConfig>,
    environment: Environment,
    channels: HashMap<AlertChannelKind, Arc<dyn AlertChannel>>,
}

impl AlertDispatcher {
    /// Dispatcher with the built-in console, webhook and log-only email channels
    pub fn new(config: AlertsConfig, environment: Environment) -> Self {
        Self {
            config: RwLock::new(config),
            environment,
            channels: HashMap::new(),
        }
        .with_channel(Arc::new(ConsoleChannel))
        .with_channel(Arc::new(WebhookChannel::new()))
        .with_channel(Arc::new(EmailChannel::default()))
    }

    /// Replace the channel registered for the same kind
    #[must_use]
    pub fn with_channel(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.channels.insert(channel.kind(), channel);
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> AlertsConfig {
        self.config.read().clone()
    }

    /// Apply a partial update and return the resulting configuration
    pub fn update_config(&self, update: AlertsConfigUpdate) -> AlertsConfig {
        let mut config = self.config.write();
        if let Some(enabled) = update.enabled {
            config.enabled = enabled;
        }
        if let Some(mut channels) = update.channels {
            let mut seen = Vec::with_capacity(channels.len());
            channels.retain(|kind| {
                if seen.contains(kind) {
                    false
                } else {
                    seen.push(*kind);
                    true
                }
            });
            config.channels = channels;
        }
        if let Some(recipients) = update.email_recipients {
            config.email_recipients = recipients;
        }
        if let Some(url) = update.webhook_url {
            config.webhook_url = url.filter(|u| !u.trim().is_empty());
        }
        if let Some(min_severity) = update.min_severity {
            config.min_severity = min_severity;
        }
        debug!(
            enabled = config.enabled,
            min_severity = %config.min_severity,
            "Alert configuration updated"
        );
        config.clone()
    }

    /// Fan an entry out to every configured channel concurrently.
    ///
    /// Never fails: a channel error is logged and recorded in the report.
    #[instrument(skip(self, entry), fields(code = %entry.code, severity = %entry.severity))]
    pub async fn send_alert(&self, entry: &ErrorLogEntry) -> DispatchReport {
        // Snapshot so the lock is not held across awaits
        let config = self.config();

        if !config.enabled || !entry.severity.meets(config.min_severity) {
            return DispatchReport::default();
        }

        let payload = AlertPayload::from_entry(entry, self.environment);
        let targets: Vec<Arc<dyn AlertChannel>> = config
            .channels
            .iter()
            .filter_map(|kind| {
                let channel = self.channels.get(kind).cloned();
                if channel.is_none() {
                    warn!(channel = %kind, "No alert channel registered");
                }
                channel
            })
            .collect();

        let results = join_all(targets.iter().map(|channel| {
            let payload = &payload;
            let config = &config;
            async move { (channel.kind(), channel.send(payload, config).await) }
        }))
        .await;

        let mut report = DispatchReport::default();
        for (kind, result) in results {
            match result {
                Ok(()) => report.delivered.push(kind),
                Err(e) => {
                    warn!(channel = %kind, error = %e, "Alert delivery failed");
                    report.failed.push(kind);
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("config", &*self.config.read())
            .field("environment", &self.environment)
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish()
    }
}
