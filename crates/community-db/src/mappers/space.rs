//! Room, group, and membership mappers

use community_core::entities::{Group, Membership, Room};
use community_core::value_objects::{ModerationScope, ScopeKind, Snowflake};
use community_core::DomainError;

use super::parse_column;
use crate::models::{MembershipModel, SpaceModel};

impl From<SpaceModel> for Room {
    fn from(model: SpaceModel) -> Self {
        Room {
            id: Snowflake::new(model.id),
            name: model.name,
            created_by: Snowflake::new(model.created_by),
            created_at: model.created_at,
        }
    }
}

impl From<SpaceModel> for Group {
    fn from(model: SpaceModel) -> Self {
        Group {
            id: Snowflake::new(model.id),
            name: model.name,
            created_by: Snowflake::new(model.created_by),
            created_at: model.created_at,
        }
    }
}

/// Membership rows do not carry their table, so the caller supplies the kind
pub fn membership_from_model(
    model: MembershipModel,
    kind: ScopeKind,
) -> Result<Membership, DomainError> {
    let space_id = Snowflake::new(model.space_id);
    let scope = match kind {
        ScopeKind::Room => ModerationScope::Room(space_id),
        ScopeKind::Group => ModerationScope::Group(space_id),
    };
    Ok(Membership {
        scope,
        user_id: Snowflake::new(model.user_id),
        role: parse_column(&model.role)?,
        joined_at: model.joined_at,
    })
}
