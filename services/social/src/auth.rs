//! Session-based authentication

use tower_sessions::Session;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{AuthUser, LoginCredentials, User},
    session::USER_ID,
    state::AppState,
};

/// The logged-in user, if any
///
/// A session pointing at a user that no longer exists counts as anonymous.
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<AuthUser>> {
    let Some(user_id) = session.get::<Uuid>(USER_ID).await? else {
        return Ok(None);
    };

    let user = state.user_repository.find_by_id(user_id).await?;
    Ok(user.as_ref().map(AuthUser::from))
}

/// Check credentials
///
/// Unknown usernames and wrong passwords both yield
/// [`AppError::AuthenticationFailure`].
pub async fn authenticate(state: &AppState, credentials: &LoginCredentials) -> AppResult<User> {
    let Some(user) = state
        .user_repository
        .find_by_username(&credentials.username)
        .await?
    else {
        warn!("Login failed for unknown user {}", credentials.username);
        return Err(AppError::AuthenticationFailure);
    };

    if !state
        .user_repository
        .verify_password(&user, &credentials.password)?
    {
        warn!("Login failed for user {}", user.id);
        return Err(AppError::AuthenticationFailure);
    }

    Ok(user)
}

/// Attach `user` to the session under a fresh session id
pub async fn login(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;
    info!("User {} logged in", user.id);
    Ok(())
}

/// Drop the session entirely
pub async fn logout(session: &Session) -> AppResult<()> {
    if let Some(user_id) = session.get::<Uuid>(USER_ID).await? {
        info!("User {} logged out", user_id);
    }
    session.flush().await?;
    Ok(())
}
