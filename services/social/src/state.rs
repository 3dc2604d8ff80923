//! Application state shared across handlers

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    media::MediaStorage,
    repositories::{FollowRepository, PostRepository, ProfileRepository, UserRepository},
    templates::Templates,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub templates: Templates,
    pub media: MediaStorage,
    pub user_repository: UserRepository,
    pub profile_repository: ProfileRepository,
    pub post_repository: PostRepository,
    pub follow_repository: FollowRepository,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: AppConfig) -> Result<Self> {
        let templates = Templates::new()?;
        let media = MediaStorage::new(config.media_root.clone(), config.max_upload_bytes);

        Ok(Self {
            user_repository: UserRepository::new(db_pool.clone()),
            profile_repository: ProfileRepository::new(db_pool.clone()),
            post_repository: PostRepository::new(db_pool.clone()),
            follow_repository: FollowRepository::new(db_pool.clone()),
            db_pool,
            config: Arc::new(config),
            templates,
            media,
        })
    }
}
