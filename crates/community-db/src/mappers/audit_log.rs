//! Audit log mappers

use community_core::entities::{AuditLogEntry, AuditStats, CountedKey};
use community_core::value_objects::Snowflake;
use community_core::DomainError;

use super::parse_column;
use crate::models::{AuditLogModel, AuditTotalsModel, CountedKeyModel};

impl TryFrom<AuditLogModel> for AuditLogEntry {
    type Error = DomainError;

    fn try_from(model: AuditLogModel) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry {
            id: Snowflake::new(model.id),
            user_id: model.user_id.map(Snowflake::new),
            action: model.action,
            resource: model.resource,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            result: parse_column(&model.result)?,
            metadata: model.metadata,
            timestamp: model.timestamp,
        })
    }
}

impl From<CountedKeyModel> for CountedKey {
    fn from(model: CountedKeyModel) -> Self {
        CountedKey {
            key: model.key,
            count: model.count,
        }
    }
}

impl AuditTotalsModel {
    pub fn into_stats(
        self,
        top_actions: Vec<CountedKeyModel>,
        top_resources: Vec<CountedKeyModel>,
    ) -> AuditStats {
        AuditStats {
            total: self.total,
            success: self.success,
            failure: self.failure,
            unique_users: self.unique_users,
            top_actions: top_actions.into_iter().map(CountedKey::from).collect(),
            top_resources: top_resources.into_iter().map(CountedKey::from).collect(),
        }
    }
}

/// Audit entry values ready for binding
pub struct AuditLogInsert<'a> {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: &'a str,
    pub resource: &'a str,
    pub ip_address: &'a str,
    pub user_agent: &'a str,
    pub result: &'static str,
}

impl<'a> AuditLogInsert<'a> {
    pub fn new(entry: &'a AuditLogEntry) -> Self {
        Self {
            id: entry.id.into_inner(),
            user_id: entry.user_id.map(Snowflake::into_inner),
            action: &entry.action,
            resource: &entry.resource,
            ip_address: &entry.ip_address,
            user_agent: &entry.user_agent,
            result: entry.result.as_str(),
        }
    }
}
