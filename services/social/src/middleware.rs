//! Middleware for session authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use crate::{
    auth::current_user,
    error::{AppError, AppResult},
    state::AppState,
};

/// Resolve the logged-in user or send the client to the login page
///
/// The user is added to the request extensions as [`crate::models::AuthUser`].
pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    mut req: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &session).await? else {
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        return Err(AppError::unauthenticated(target));
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
