//! Post repository for database operations
//!
//! Every mutation is scoped by owner: the post id and the acting user id are
//! both part of the filter, so another user's post behaves exactly like a
//! post that does not exist.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::{FeedPost, ImageChange, NewPost, Post, UpdatePost};

/// Post repository
#[derive(Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a post owned by `user_id`
    pub async fn create(&self, user_id: Uuid, new_post: &NewPost) -> Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            message: new_post.message.clone(),
            image: new_post.image.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, message, image, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.message)
        .bind(post.image.as_deref())
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        info!("User {} created post {}", user_id, post.id);
        Ok(post)
    }

    /// Posts of a user, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, message, image, created_at
            FROM posts
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Posts by the users `follower` follows, newest first
    pub async fn list_followed_by(&self, follower: Uuid) -> Result<Vec<FeedPost>> {
        let posts = sqlx::query_as::<_, FeedPost>(
            r#"
            SELECT p.id, u.username, p.message, p.image, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            JOIN profiles pr ON pr.user_id = p.user_id
            JOIN profile_followers f ON f.profile_id = pr.id
            WHERE f.user_id = ? AND p.user_id <> ?
            ORDER BY p.created_at DESC, p.rowid DESC
            "#,
        )
        .bind(follower)
        .bind(follower)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Number of posts owned by a user
    pub async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Find a post only if `owner` owns it
    pub async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, message, image, created_at
            FROM posts
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Update message and image of a post owned by `owner`
    ///
    /// Returns `None` when there is no such post for this owner.
    pub async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        update: &UpdatePost,
    ) -> Result<Option<Post>> {
        let (replace_image, image) = match &update.image {
            ImageChange::Keep => (false, None),
            ImageChange::Replace(image) => (true, Some(image.as_str())),
            ImageChange::Clear => (true, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET message = ?,
                image = CASE WHEN ? THEN ? ELSE image END
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&update.message)
        .bind(replace_image)
        .bind(image)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("User {} edited post {}", owner, id);
        self.find_owned(id, owner).await
    }

    /// Delete a post owned by `owner`; false when nothing matched
    pub async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("User {} deleted post {}", owner, id);
        }
        Ok(deleted)
    }
}
