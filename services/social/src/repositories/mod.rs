//! Repositories for database operations

pub mod follow;
pub mod post;
pub mod profile;
pub mod user;

pub use follow::FollowRepository;
pub use post::PostRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;

/// Whether a repository failure was caused by a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .is_some_and(common::error::is_unique_violation)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    let pool = init_pool(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    run_migrations(&pool).await.expect("Failed to migrate");
    pool
}
