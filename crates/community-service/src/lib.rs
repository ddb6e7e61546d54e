//! # community-service
//!
//! Application layer: moderation policy, notification delivery, the audit
//! trail, error logging and alert routing.

pub mod alerting;
pub mod dto;
pub mod services;

#[cfg(test)]
mod testing;

pub use alerting::{AlertDispatcher, AlertsConfigUpdate, ErrorLogEntry};
pub use services::{
    AuditService, ErrorLogger, ModerationService, NotificationService, RequestMeta,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, ServiceSettings,
};
