//! Follow / unfollow toggle

use axum::{
    Extension,
    extract::{Path, State},
    response::Redirect,
};
use tower_sessions::Session;

use crate::{
    error::{AppError, AppResult},
    flash,
    models::{AuthUser, FollowPolicy, FollowState},
    routes::parse_id,
    state::AppState,
};

/// Follow the owner of a profile, or stop following them
pub async fn follow_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
    Path(profile_id): Path<String>,
) -> AppResult<Redirect> {
    let profile_id = parse_id(&profile_id)?;
    let target = state
        .profile_repository
        .find_card(profile_id, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    if target.user_id == user.id && state.config.self_follow == FollowPolicy::Forbid {
        flash::error(&session, "You cannot follow yourself.").await?;
        return Ok(Redirect::to("/"));
    }

    let message = match state.follow_repository.toggle(target.id, user.id).await? {
        FollowState::Following => format!("You are now following {}.", target.username),
        FollowState::NotFollowing => format!("You unfollowed {}.", target.username),
    };
    flash::success(&session, message).await?;

    Ok(Redirect::to("/"))
}
