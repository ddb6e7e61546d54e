//! Post and message mappers

use community_core::entities::{Message, Post};
use community_core::value_objects::Snowflake;

use crate::models::{MessageModel, PostModel};

impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: Snowflake::new(model.id),
            group_id: model.group_id.map(Snowflake::new),
            author_id: Snowflake::new(model.author_id),
            title: model.title,
            created_at: model.created_at,
        }
    }
}

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            room_id: model.room_id.map(Snowflake::new),
            group_id: model.group_id.map(Snowflake::new),
            author_id: Snowflake::new(model.author_id),
            content: model.content,
            created_at: model.created_at,
        }
    }
}
