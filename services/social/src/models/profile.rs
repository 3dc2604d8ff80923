//! Profile model and related functionality

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Picture reference every profile starts with
pub const DEFAULT_PROFILE_PICTURE: &str = "default.jpg";

/// Profile entity, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_picture: String,
    pub bio: String,
}

/// Profile update payload
///
/// `profile_picture` is only replaced when a new one was uploaded.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub profile_picture: Option<String>,
    pub bio: String,
}

/// A profile as seen by another user
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub profile_picture: String,
    pub bio: String,
    pub follower_count: i64,
    pub is_following: bool,
}

/// A user following some profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Follower {
    pub user_id: Uuid,
    pub username: String,
}
