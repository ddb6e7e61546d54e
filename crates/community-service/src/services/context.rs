//! Service context - dependency container for services
//!
//! Holds all repositories, the ID generator, and the alert dispatcher.

use std::sync::Arc;

use community_common::Environment;
use community_core::traits::{
    AuditLogRepository, GroupRepository, MembershipRepository, MessageRepository,
    ModerationLogRepository, MuteRepository, NotificationRepository, PostRepository,
    RoomRepository, UserRepository,
};
use community_core::{Snowflake, SnowflakeGenerator};

use crate::alerting::AlertDispatcher;

use super::error::{ServiceError, ServiceResult};

/// Behaviour switches the services read at runtime
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub environment: Environment,
    /// Preference gate answer when a user's flags cannot be read
    pub preference_fail_open: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            preference_fail_open: true,
        }
    }
}

/// Service context containing all dependencies
///
/// Built once at startup and shared by reference with every service.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    room_repo: Arc<dyn RoomRepository>,
    group_repo: Arc<dyn GroupRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    post_repo: Arc<dyn PostRepository>,
    message_repo: Arc<dyn MessageRepository>,
    moderation_log_repo: Arc<dyn ModerationLogRepository>,
    mute_repo: Arc<dyn MuteRepository>,
    audit_log_repo: Arc<dyn AuditLogRepository>,
    notification_repo: Arc<dyn NotificationRepository>,

    // Infrastructure
    snowflake_generator: Arc<SnowflakeGenerator>,
    alerts: Arc<AlertDispatcher>,
    settings: ServiceSettings,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn room_repo(&self) -> &dyn RoomRepository {
        self.room_repo.as_ref()
    }

    pub fn group_repo(&self) -> &dyn GroupRepository {
        self.group_repo.as_ref()
    }

    pub fn membership_repo(&self) -> &dyn MembershipRepository {
        self.membership_repo.as_ref()
    }

    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn moderation_log_repo(&self) -> &dyn ModerationLogRepository {
        self.moderation_log_repo.as_ref()
    }

    pub fn mute_repo(&self) -> &dyn MuteRepository {
        self.mute_repo.as_ref()
    }

    pub fn audit_log_repo(&self) -> &dyn AuditLogRepository {
        self.audit_log_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    // === Infrastructure ===

    /// Get the alert dispatcher
    pub fn alerts(&self) -> &AlertDispatcher {
        self.alerts.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("alerts", &self.alerts)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    room_repo: Option<Arc<dyn RoomRepository>>,
    group_repo: Option<Arc<dyn GroupRepository>>,
    membership_repo: Option<Arc<dyn MembershipRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    moderation_log_repo: Option<Arc<dyn ModerationLogRepository>>,
    mute_repo: Option<Arc<dyn MuteRepository>>,
    audit_log_repo: Option<Arc<dyn AuditLogRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    alerts: Option<Arc<AlertDispatcher>>,
    settings: ServiceSettings,
}

fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn room_repo(mut self, repo: Arc<dyn RoomRepository>) -> Self {
        self.room_repo = Some(repo);
        self
    }

    pub fn group_repo(mut self, repo: Arc<dyn GroupRepository>) -> Self {
        self.group_repo = Some(repo);
        self
    }

    pub fn membership_repo(mut self, repo: Arc<dyn MembershipRepository>) -> Self {
        self.membership_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn moderation_log_repo(mut self, repo: Arc<dyn ModerationLogRepository>) -> Self {
        self.moderation_log_repo = Some(repo);
        self
    }

    pub fn mute_repo(mut self, repo: Arc<dyn MuteRepository>) -> Self {
        self.mute_repo = Some(repo);
        self
    }

    pub fn audit_log_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_log_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn alerts(mut self, dispatcher: Arc<AlertDispatcher>) -> Self {
        self.alerts = Some(dispatcher);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            room_repo: required(self.room_repo, "room_repo")?,
            group_repo: required(self.group_repo, "group_repo")?,
            membership_repo: required(self.membership_repo, "membership_repo")?,
            post_repo: required(self.post_repo, "post_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            moderation_log_repo: required(self.moderation_log_repo, "moderation_log_repo")?,
            mute_repo: required(self.mute_repo, "mute_repo")?,
            audit_log_repo: required(self.audit_log_repo, "audit_log_repo")?,
            notification_repo: required(self.notification_repo, "notification_repo")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
            alerts: required(self.alerts, "alerts")?,
            settings: self.settings,
        })
    }
}
