//! Post model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post written by someone the viewer follows
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedPost {
    pub id: Uuid,
    pub username: String,
    pub message: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New post creation payload
#[derive(Debug, Clone)]
pub struct NewPost {
    pub message: String,
    pub image: Option<String>,
}

/// What happens to the image of an edited post
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(String),
    Clear,
}

/// Post update payload
#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub message: String,
    pub image: ImageChange,
}
