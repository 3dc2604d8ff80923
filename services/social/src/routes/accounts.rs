//! Registration, login and logout

use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tera::Context;
use tower_sessions::Session;
use tracing::{debug, info};

use crate::{
    auth,
    error::{AppError, AppResult},
    flash,
    forms::{FormErrors, LoginForm, RegisterForm},
    repositories::is_unique_violation,
    routes::render,
    state::AppState,
};

const USERNAME_TAKEN: &str = "This username is already taken. Please choose a different one.";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Registration page
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Response> {
    if auth::current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = RegisterForm::default();
    let page = render_register(&state, &session, &form, &FormErrors::new()).await?;
    Ok(page.into_response())
}

/// Create a user and its profile, then send them to the login page
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if auth::current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let (new_user, mut errors) = match form.validate() {
        Ok(new_user) => (Some(new_user), FormErrors::new()),
        Err(errors) => (None, errors),
    };

    let username = form.username.trim();
    if !errors.has("username") && state.user_repository.username_exists(username).await? {
        errors.add("username", USERNAME_TAKEN);
    }

    if let Some(new_user) = new_user.filter(|_| errors.is_empty()) {
        match state.user_repository.create(&new_user).await {
            Ok(user) => {
                info!("Registered user {} ({})", user.username, user.id);
                flash::success(&session, "Registration successful.").await?;
                return Ok(Redirect::to("/login").into_response());
            }
            Err(e) if is_unique_violation(&e) => errors.add("username", USERNAME_TAKEN),
            Err(e) => return Err(e.into()),
        }
    }

    debug!("Registration rejected: {}", errors);
    flash::error(&session, "Please correct the error below.").await?;
    let page = render_register(&state, &session, &form, &errors).await?;
    Ok(page.into_response())
}

async fn render_register(
    state: &AppState,
    session: &Session,
    form: &RegisterForm,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, session, None, "auth/register.html", context).await
}

/// Login page
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> AppResult<Response> {
    if auth::current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };

    let page = render_login(&state, &session, &form, &FormErrors::new()).await?;
    Ok(page.into_response())
}

/// Check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let outcome = match form.validate() {
        Ok(credentials) => auth::authenticate(&state, &credentials).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    let errors = match outcome {
        Ok(user) => {
            auth::login(&session, &user).await?;
            return Ok(Redirect::to(form.redirect_target()).into_response());
        }
        Err(AppError::AuthenticationFailure) => FormErrors::new(),
        Err(AppError::Validation(errors)) => errors,
        Err(e) => return Err(e),
    };

    flash::error(&session, "Invalid username or password.").await?;
    let page = render_login(&state, &session, &form, &errors).await?;
    Ok(page.into_response())
}

async fn render_login(
    state: &AppState,
    session: &Session,
    form: &LoginForm,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, session, None, "auth/login.html", context).await
}

/// End the session
pub async fn logout(session: Session) -> AppResult<Redirect> {
    auth::logout(&session).await?;
    Ok(Redirect::to("/login"))
}
