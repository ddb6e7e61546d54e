//! Severity-based alert routing
//!
//! Critical error entries are turned into an [`AlertPayload`] and fanned out
//! to every configured [`AlertChannel`] at once. A failing channel is logged
//! and never affects the others or the caller.

mod channels;
mod dispatcher;
mod entry;

pub use channels::{
    AlertChannel, AlertError, AlertMailer, ConsoleChannel, EmailChannel, LogMailer,
    WebhookChannel, ALERT_USER_AGENT,
};
pub use dispatcher::{AlertDispatcher, AlertsConfigUpdate, DispatchReport};
pub use entry::{AlertPayload, ErrorLogEntry};
