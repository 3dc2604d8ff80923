//! Profile view and edit

use axum::{
    Extension,
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context;
use tower_sessions::Session;
use tracing::{debug, info};

use crate::{
    auth,
    error::AppResult,
    forms::{FormErrors, ProfileForm},
    media::{MediaKind, MultipartForm},
    models::{AuthUser, DEFAULT_PROFILE_PICTURE, Post, Profile, UpdateProfile},
    routes::render,
    state::AppState,
};

/// The requester's own posts; anonymous visitors get an empty page
pub async fn profile(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let user = auth::current_user(&state, &session).await?;

    let (posts, profile) = match &user {
        Some(user) => (
            state.post_repository.list_by_user(user.id).await?,
            state.profile_repository.find_by_user(user.id).await?,
        ),
        None => (Vec::<Post>::new(), None),
    };

    let mut context = Context::new();
    context.insert("posts", &posts);
    context.insert(
        "profile_picture",
        profile
            .as_ref()
            .map_or(DEFAULT_PROFILE_PICTURE, |p| p.profile_picture.as_str()),
    );
    context.insert("bio", profile.as_ref().map_or("", |p| p.bio.as_str()));

    render(&state, &session, user.as_ref(), "profile.html", context).await
}

/// Profile edit form
pub async fn profile_edit_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
) -> AppResult<Html<String>> {
    let (profile, _) = state.profile_repository.get_or_create(user.id).await?;

    let form = ProfileForm {
        bio: profile.bio.clone(),
        ..ProfileForm::default()
    };

    render_edit(&state, &session, &user, &profile, &form, &FormErrors::new()).await
}

/// Update picture and bio of the requester's profile
pub async fn profile_edit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let (profile, _) = state.profile_repository.get_or_create(user.id).await?;
    let form = ProfileForm::from_multipart(MultipartForm::read(multipart).await?);

    let valid = match form.validate(&state.media) {
        Ok(valid) => valid,
        Err(errors) => {
            debug!("Profile form errors for user {}: {}", user.id, errors);
            let page = render_edit(&state, &session, &user, &profile, &form, &errors).await?;
            return Ok(page.into_response());
        }
    };

    let profile_picture = match &valid.profile_picture {
        Some(upload) => Some(state.media.save(MediaKind::ProfilePicture, upload).await?),
        None => None,
    };

    let update = UpdateProfile {
        profile_picture,
        bio: valid.bio,
    };
    state.profile_repository.update(profile.id, &update).await?;
    info!("User {} updated their profile", user.id);

    Ok(Redirect::to("/profile").into_response())
}

async fn render_edit(
    state: &AppState,
    session: &Session,
    user: &AuthUser,
    profile: &Profile,
    form: &ProfileForm,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("profile", profile);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("max_bio_chars", &ProfileForm::MAX_BIO_CHARS);
    render(state, session, Some(user), "profile_edit.html", context).await
}
