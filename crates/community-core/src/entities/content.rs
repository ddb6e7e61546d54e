//! Moderatable content - group posts and room/group messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseEnumError;
use crate::value_objects::{ModerationScope, Snowflake};

/// Kind of content a flag targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Post,
    Message,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Message => "MESSAGE",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(Self::Post),
            "MESSAGE" => Ok(Self::Message),
            _ => Err(ParseEnumError::new("content type", s)),
        }
    }
}

/// Group post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub group_id: Option<Snowflake>,
    pub author_id: Snowflake,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Chat message posted in a room or a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub room_id: Option<Snowflake>,
    pub group_id: Option<Snowflake>,
    pub author_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// What moderation needs to know about a piece of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub id: Snowflake,
    pub content_type: ContentType,
    pub author_id: Snowflake,
    /// `None` for content that belongs to neither a room nor a group
    pub scope: Option<ModerationScope>,
    /// Short human label (post title or message excerpt)
    pub label: String,
}

/// Excerpt length for message labels
const EXCERPT_CHARS: usize = 50;

impl From<Post> for ContentRef {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            content_type: ContentType::Post,
            author_id: post.author_id,
            scope: post.group_id.map(ModerationScope::Group),
            label: post.title,
        }
    }
}

impl From<Message> for ContentRef {
    fn from(message: Message) -> Self {
        // A message in a room that also names its group is moderated by the room
        let scope = message
            .room_id
            .map(ModerationScope::Room)
            .or(message.group_id.map(ModerationScope::Group));
        let mut label: String = message.content.chars().take(EXCERPT_CHARS).collect();
        if message.content.chars().count() > EXCERPT_CHARS {
            label.push_str("...");
        }
        Self {
            id: message.id,
            content_type: ContentType::Message,
            author_id: message.author_id,
            scope,
            label,
        }
    }
}
