//! Follow repository: the directed follower → followee edge set

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::FollowState;

/// Follow repository
#[derive(Clone)]
pub struct FollowRepository {
    pool: SqlitePool,
}

impl FollowRepository {
    /// Create a new follow repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current state of the `follower` → owner of `profile_id` edge
    pub async fn state(&self, profile_id: Uuid, follower: Uuid) -> Result<FollowState> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM profile_followers WHERE profile_id = ? AND user_id = ?",
        )
        .bind(profile_id)
        .bind(follower)
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowState::from_following(count > 0))
    }

    /// Add the edge; a no-op when it already exists
    pub async fn follow(&self, profile_id: Uuid, follower: Uuid) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO profile_followers (profile_id, user_id) VALUES (?, ?)")
            .bind(profile_id)
            .bind(follower)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove the edge; a no-op when it does not exist
    pub async fn unfollow(&self, profile_id: Uuid, follower: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM profile_followers WHERE profile_id = ? AND user_id = ?")
            .bind(profile_id)
            .bind(follower)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Flip the edge and return the new state
    ///
    /// Two concurrent toggles on the same pair resolve last-write-wins.
    pub async fn toggle(&self, profile_id: Uuid, follower: Uuid) -> Result<FollowState> {
        let next = self.state(profile_id, follower).await?.toggled();

        match next {
            FollowState::Following => self.follow(profile_id, follower).await?,
            FollowState::NotFollowing => self.unfollow(profile_id, follower).await?,
        }

        info!(
            "User {} toggled follow on profile {}: {:?}",
            follower, profile_id, next
        );
        Ok(next)
    }
}
