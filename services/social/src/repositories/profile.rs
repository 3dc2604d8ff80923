//! Profile repository for database operations

use anyhow::Result;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{DEFAULT_PROFILE_PICTURE, Follower, Profile, ProfileCard, UpdateProfile};

/// Profile repository
#[derive(Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the profile owned by a user
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, profile_picture, bio FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Fetch the profile of a user, creating it if it does not exist yet
    ///
    /// The unique constraint on `user_id` keeps this idempotent: at most one
    /// row is ever created per user. The flag tells whether this call created it.
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<(Profile, bool)> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO profiles (id, user_id, profile_picture, bio)
            VALUES (?, ?, ?, '')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(DEFAULT_PROFILE_PICTURE)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() == 1;
        if created {
            info!("Created missing profile for user: {}", user_id);
        }

        let profile = self
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile for user {} vanished", user_id))?;

        Ok((profile, created))
    }

    /// Update picture and bio of a profile
    pub async fn update(&self, profile_id: Uuid, update: &UpdateProfile) -> Result<Profile> {
        info!("Updating profile: {}", profile_id);

        sqlx::query(
            r#"
            UPDATE profiles
            SET profile_picture = COALESCE(?, profile_picture),
                bio = ?
            WHERE id = ?
            "#,
        )
        .bind(update.profile_picture.as_deref())
        .bind(&update.bio)
        .bind(profile_id)
        .execute(&self.pool)
        .await?;

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, profile_picture, bio FROM profiles WHERE id = ?",
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Find a profile card by profile id, as seen by `viewer`
    pub async fn find_card(&self, profile_id: Uuid, viewer: Uuid) -> Result<Option<ProfileCard>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.user_id, u.username, p.profile_picture, p.bio,
                   (SELECT COUNT(*) FROM profile_followers f WHERE f.profile_id = p.id) AS follower_count,
                   (SELECT COUNT(*) FROM profile_followers f WHERE f.profile_id = p.id AND f.user_id = ?) AS is_following
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = ?
            "#,
        )
        .bind(viewer)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| card_from_row(&row)))
    }

    /// Every profile except the viewer's own, ordered by username
    pub async fn list_others(&self, viewer: Uuid) -> Result<Vec<ProfileCard>> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.user_id, u.username, p.profile_picture, p.bio,
                   (SELECT COUNT(*) FROM profile_followers f WHERE f.profile_id = p.id) AS follower_count,
                   (SELECT COUNT(*) FROM profile_followers f WHERE f.profile_id = p.id AND f.user_id = ?) AS is_following
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.user_id <> ?
            ORDER BY u.username
            "#,
        )
        .bind(viewer)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(card_from_row).collect())
    }

    /// Users following a profile, ordered by username
    pub async fn followers(&self, profile_id: Uuid) -> Result<Vec<Follower>> {
        let followers = sqlx::query_as::<_, Follower>(
            r#"
            SELECT u.id AS user_id, u.username
            FROM profile_followers f
            JOIN users u ON u.id = f.user_id
            WHERE f.profile_id = ?
            ORDER BY u.username
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(followers)
    }
}

fn card_from_row(row: &SqliteRow) -> ProfileCard {
    let is_following: i64 = row.get("is_following");
    ProfileCard {
        id: row.get("id"),
        user_id: row.get("user_id"),
        username: row.get("username"),
        profile_picture: row.get("profile_picture"),
        bio: row.get("bio"),
        follower_count: row.get("follower_count"),
        is_following: is_following > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{FollowRepository, UserRepository, test_pool};
    use crate::models::NewUser;

    async fn user(pool: &SqlitePool, username: &str) -> Uuid {
        UserRepository::new(pool.clone())
            .create(&NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let pool = test_pool().await;
        let profiles = ProfileRepository::new(pool.clone());
        let user_id = user(&pool, "alice").await;

        // Simulate an account that predates profile creation at registration
        sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(profiles.find_by_user(user_id).await.unwrap().is_none());

        let (first, created) = profiles.get_or_create(user_id).await.unwrap();
        assert!(created);
        assert_eq!(first.profile_picture, DEFAULT_PROFILE_PICTURE);
        assert_eq!(first.bio, "");

        let (second, created) = profiles.get_or_create(user_id).await.unwrap();
        assert!(!created);
        assert_eq!(first, second);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_picture_unless_replaced() {
        let pool = test_pool().await;
        let profiles = ProfileRepository::new(pool.clone());
        let user_id = user(&pool, "bob").await;
        let profile = profiles.find_by_user(user_id).await.unwrap().unwrap();

        let updated = profiles
            .update(
                profile.id,
                &UpdateProfile {
                    profile_picture: None,
                    bio: "hello there".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio, "hello there");
        assert_eq!(updated.profile_picture, DEFAULT_PROFILE_PICTURE);

        let updated = profiles
            .update(
                profile.id,
                &UpdateProfile {
                    profile_picture: Some("profile_pics/bob.png".to_string()),
                    bio: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.profile_picture, "profile_pics/bob.png");
        assert_eq!(updated.bio, "");
    }

    #[tokio::test]
    async fn test_cards_report_follow_state() {
        let pool = test_pool().await;
        let profiles = ProfileRepository::new(pool.clone());
        let follows = FollowRepository::new(pool.clone());
        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let carol = user(&pool, "carol").await;
        let bob_profile = profiles.find_by_user(bob).await.unwrap().unwrap();

        follows.follow(bob_profile.id, alice).await.unwrap();
        follows.follow(bob_profile.id, carol).await.unwrap();

        let others = profiles.list_others(alice).await.unwrap();
        let names: Vec<_> = others.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "carol"]);
        assert!(others[0].is_following);
        assert_eq!(others[0].follower_count, 2);
        assert!(!others[1].is_following);

        let card = profiles.find_card(bob_profile.id, carol).await.unwrap().unwrap();
        assert!(card.is_following);
        assert!(profiles.find_card(Uuid::new_v4(), carol).await.unwrap().is_none());

        let followers = profiles.followers(bob_profile.id).await.unwrap();
        let names: Vec<_> = followers.iter().map(|f| f.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "carol"]);
    }
}
