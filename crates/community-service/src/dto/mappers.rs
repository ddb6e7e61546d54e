//! Domain to DTO mappers

use community_common::{AlertsConfig, Environment};

use super::responses::AlertConfigResponse;

impl AlertConfigResponse {
    pub fn new(config: AlertsConfig, environment: Environment) -> Self {
        Self {
            enabled: config.enabled,
            channels: config.channels,
            email_recipients: config.email_recipients,
            webhook_url: config.webhook_url,
            min_severity: config.min_severity,
            environment: environment.as_str(),
        }
    }
}

impl From<(AlertsConfig, Environment)> for AlertConfigResponse {
    fn from((config, environment): (AlertsConfig, Environment)) -> Self {
        Self::new(config, environment)
    }
}
