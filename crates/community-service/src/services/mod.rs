//! Business logic services
//!
//! Every service borrows the shared [`ServiceContext`]; construct one per
//! call site with `XService::new(&ctx)`.

pub mod audit;
pub mod context;
pub mod error;
pub mod error_logger;
pub mod moderation;
pub mod notification;
pub mod request_meta;

use std::future::Future;

use tracing::warn;

pub use audit::{AuditPage, AuditRecord, AuditService, DataOperation};
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use error_logger::{ErrorLogger, LogOptions};
pub use moderation::{ModerationService, MuteCommand, MuteOutcome, MAX_MUTE_MINUTES};
pub use notification::{NewNotification, NotificationService};
pub use request_meta::RequestMeta;

/// Run a side effect whose failure must not affect the caller.
///
/// The error is logged and dropped.
pub(crate) async fn best_effort<T, F>(what: &'static str, effect: F) -> Option<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match effect.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(side_effect = what, error = %e, "Best-effort side effect failed");
            None
        }
    }
}
