//! Custom error types for the social service

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tera::Context;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    flash::FlashMessage,
    forms::FormErrors,
    media::StorageError,
    models::AuthUser,
    templates::Templates,
};

/// Custom error type for the social service
#[derive(Error, Debug)]
pub enum AppError {
    /// Field-level validation errors
    #[error("Invalid form: {0}")]
    Validation(FormErrors),

    /// Missing resource, or one the requester does not own
    #[error("Not found")]
    NotFound,

    /// Unknown username or wrong password
    #[error("Invalid username or password.")]
    AuthenticationFailure,

    /// A login is required to see `next`
    #[error("Login required")]
    Unauthenticated { next: String },

    #[error("Malformed form body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthenticated(next: impl Into<String>) -> Self {
        AppError::Unauthenticated { next: next.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthenticated { next } => {
                return Redirect::to(&login_url(&next)).into_response();
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Page not found".to_string()),
            AppError::Validation(errors) => {
                debug!("Unhandled form errors: {}", errors);
                (StatusCode::BAD_REQUEST, errors.to_string())
            }
            AppError::AuthenticationFailure => {
                (StatusCode::UNAUTHORIZED, "Invalid username or password.".to_string())
            }
            AppError::Multipart(e) => {
                debug!("Rejected multipart body: {}", e);
                (e.status(), e.body_text())
            }
            AppError::Storage(e @ (StorageError::Io(_) | StorageError::Encode(_))) => {
                error!("Failed to store upload: {}", e);
                internal()
            }
            AppError::Storage(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Session(e) => {
                error!("Session error: {}", e);
                internal()
            }
            AppError::Template(e) => {
                error!("Failed to render template: {:?}", e);
                internal()
            }
            AppError::Database(e) => {
                error!("Database error: {}", e);
                internal()
            }
            AppError::Internal(e) => {
                error!("Internal error: {:#}", e);
                internal()
            }
        };

        error_page(status, &message)
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;

/// Login page URL that returns to `next` afterwards
pub fn login_url(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) if !next.is_empty() => format!("/login?{query}"),
        _ => "/login".to_string(),
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Error page in the site layout, or plain text if the template fails
fn error_page(status: StatusCode, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("user", &None::<AuthUser>);
    context.insert("messages", &Vec::<FlashMessage>::new());
    context.insert("code", &status.as_u16());
    context.insert("title", status.canonical_reason().unwrap_or("Error"));
    context.insert("message", message);

    match Templates::new().and_then(|templates| templates.render("error.html", &context)) {
        Ok(page) => (status, Html(page)).into_response(),
        Err(e) => {
            error!("Failed to render error page: {:?}", e);
            (status, message.to_string()).into_response()
        }
    }
}
