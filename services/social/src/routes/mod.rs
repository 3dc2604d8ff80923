//! Social service routes

pub mod accounts;
pub mod follows;
pub mod posts;
pub mod profiles;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    middleware,
    response::{Html, IntoResponse},
    routing::get,
};
use serde_json::json;
use tera::Context;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    flash,
    media::MEDIA_URL,
    middleware::require_login,
    models::AuthUser,
    session::session_layer,
    state::AppState,
};

/// Room for the text fields around an upload
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the router for the social service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", get(posts::index).post(posts::create_post))
        .route(
            "/posts/{post_id}/edit",
            get(posts::edit_post_page).post(posts::edit_post),
        )
        .route(
            "/posts/{post_id}/delete",
            get(posts::delete_post_page).post(posts::delete_post),
        )
        .route(
            "/profile/edit",
            get(profiles::profile_edit_page).post(profiles::profile_edit),
        )
        .route(
            "/profile/update",
            get(profiles::profile_edit_page).post(profiles::profile_edit),
        )
        .route(
            "/follow/{profile_id}",
            get(follows::follow_user).post(follows::follow_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/health", get(health_check))
        .route("/login", get(accounts::login_page).post(accounts::login))
        .route("/logout", get(accounts::logout).post(accounts::logout))
        .route("/register", get(accounts::register_page).post(accounts::register))
        .route("/profile", get(profiles::profile))
        .merge(protected_routes)
        .nest_service(MEDIA_URL, ServeDir::new(state.media.root()))
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_bytes + FORM_OVERHEAD_BYTES,
        ))
        .layer(session_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let database = common::database::health_check(&state.db_pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "service": "social",
        "database": database,
    })))
}

/// Render a page with the current user and pending flash messages
pub(crate) async fn render(
    state: &AppState,
    session: &Session,
    user: Option<&AuthUser>,
    template: &str,
    mut context: Context,
) -> AppResult<Html<String>> {
    context.insert("user", &user);
    context.insert("messages", &flash::take(session).await?);

    Ok(Html(state.templates.render(template, &context)?))
}

/// Ids in paths that do not parse name nothing, like unknown ids
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    raw.parse().map_err(|_| AppError::NotFound)
}
