//! Home view and post management
//!
//! Every post lookup is filtered by the requester, so posts owned by someone
//! else answer with 404 exactly like missing ones.

use axum::{
    Extension,
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context;
use tower_sessions::Session;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    forms::{FormErrors, PostForm},
    media::{MediaKind, MultipartForm},
    models::{AuthUser, ImageChange, NewPost, Post, UpdatePost},
    routes::{parse_id, render},
    state::AppState,
};

/// Home view
pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
) -> AppResult<Html<String>> {
    render_home(&state, &session, &user, &PostForm::default(), &FormErrors::new()).await
}

/// Create a post owned by the requester
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = PostForm::from_multipart(MultipartForm::read(multipart).await?);

    match form.validate(&state.media) {
        Ok(valid) => {
            let image = match &valid.image {
                Some(upload) => Some(state.media.save(MediaKind::PostImage, upload).await?),
                None => None,
            };

            let new_post = NewPost {
                message: valid.message,
                image,
            };
            state.post_repository.create(user.id, &new_post).await?;

            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => {
            debug!("Post form errors for user {}: {}", user.id, errors);
            let page = render_home(&state, &session, &user, &form, &errors).await?;
            Ok(page.into_response())
        }
    }
}

async fn render_home(
    state: &AppState,
    session: &Session,
    user: &AuthUser,
    form: &PostForm,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let profile = state
        .profile_repository
        .find_by_user(user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let posts = state.post_repository.list_by_user(user.id).await?;
    let followed_posts = state.post_repository.list_followed_by(user.id).await?;
    let profiles = state.profile_repository.list_others(user.id).await?;
    let followers = state.profile_repository.followers(profile.id).await?;

    let mut context = Context::new();
    context.insert("profile", &profile);
    context.insert("posts", &posts);
    context.insert("followed_posts", &followed_posts);
    context.insert("profiles", &profiles);
    context.insert("followers", &followers);
    context.insert("form", form);
    context.insert("errors", errors);

    render(state, session, Some(user), "index.html", context).await
}

async fn owned_post(state: &AppState, user: &AuthUser, post_id: &str) -> AppResult<Post> {
    let id = parse_id(post_id)?;
    state
        .post_repository
        .find_owned(id, user.id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Edit form for one of the requester's posts
pub async fn edit_post_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
    Path(post_id): Path<String>,
) -> AppResult<Html<String>> {
    let post = owned_post(&state, &user, &post_id).await?;
    let form = PostForm {
        message: post.message.clone(),
        ..PostForm::default()
    };

    render_edit(&state, &session, &user, &post, &form, &FormErrors::new()).await
}

/// Update message and image of one of the requester's posts
pub async fn edit_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post = owned_post(&state, &user, &post_id).await?;
    let form = PostForm::from_multipart(MultipartForm::read(multipart).await?);

    let valid = match form.validate(&state.media) {
        Ok(valid) => valid,
        Err(errors) => {
            debug!("Edit form errors for post {}: {}", post.id, errors);
            let page = render_edit(&state, &session, &user, &post, &form, &errors).await?;
            return Ok(page.into_response());
        }
    };

    let image = match &valid.image {
        Some(upload) => ImageChange::Replace(state.media.save(MediaKind::PostImage, upload).await?),
        None if valid.clear_image => ImageChange::Clear,
        None => ImageChange::Keep,
    };

    let update = UpdatePost {
        message: valid.message,
        image,
    };
    state
        .post_repository
        .update_owned(post.id, user.id, &update)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Redirect::to("/profile").into_response())
}

async fn render_edit(
    state: &AppState,
    session: &Session,
    user: &AuthUser,
    post: &Post,
    form: &PostForm,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("post", post);
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, session, Some(user), "edit_post.html", context).await
}

/// Confirmation page before deleting one of the requester's posts
pub async fn delete_post_page(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    session: Session,
    Path(post_id): Path<String>,
) -> AppResult<Html<String>> {
    let post = owned_post(&state, &user, &post_id).await?;

    let mut context = Context::new();
    context.insert("post", &post);
    render(&state, &session, Some(&user), "delete_post_confirm.html", context).await
}

/// Delete one of the requester's posts
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> AppResult<Redirect> {
    let id = parse_id(&post_id)?;

    if !state.post_repository.delete_owned(id, user.id).await? {
        return Err(AppError::NotFound);
    }

    Ok(Redirect::to("/profile"))
}
