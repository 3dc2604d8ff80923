//! Typed forms and their validation
//!
//! Each form is a plain request struct with a `validate` method that returns
//! either the cleaned data or a map of field name to error messages.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::{
    media::{MediaStorage, MultipartForm, Upload},
    models::{LoginCredentials, NewUser},
    validation::{validate_email, validate_password, validate_username},
};

const REQUIRED: &str = "This field is required.";

/// Validation errors keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Registration form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl RegisterForm {
    /// Check every field; username availability is checked by the caller
    pub fn validate(&self) -> Result<NewUser, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        let email = self.email.trim();

        if let Err(e) = validate_username(username) {
            errors.add("username", e);
        }

        if let Err(e) = validate_email(email) {
            errors.add("email", e);
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if let Err(messages) = validate_password(&self.password1, username) {
            for message in messages {
                errors.add("password1", message);
            }
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password1.clone(),
        })
    }
}

/// Login form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub next: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginCredentials, FormErrors> {
        let mut errors = FormErrors::new();

        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        } else if self.username.chars().count() > 150 {
            errors.add("username", "Ensure this value has at most 150 characters.");
        }

        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result(LoginCredentials {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Where to go after logging in; only local paths are honoured
    pub fn redirect_target(&self) -> &str {
        match self.next.as_deref() {
            Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
            _ => "/",
        }
    }
}

/// Post form, used to create and edit posts
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostForm {
    pub message: String,
    #[serde(skip)]
    pub image: Option<Upload>,
    pub clear_image: bool,
}

/// Cleaned post form data
#[derive(Debug, Clone)]
pub struct ValidPost {
    pub message: String,
    pub image: Option<Upload>,
    pub clear_image: bool,
}

impl PostForm {
    pub fn from_multipart(mut form: MultipartForm) -> Self {
        Self {
            message: form.text("message").unwrap_or_default().to_string(),
            clear_image: form.text("clear_image").is_some_and(is_checked),
            image: form.take_file("image"),
        }
    }

    pub fn validate(&self, storage: &MediaStorage) -> Result<ValidPost, FormErrors> {
        let mut errors = FormErrors::new();
        let message = self.message.trim();

        if message.is_empty() {
            errors.add("message", REQUIRED);
        }

        if let Some(image) = &self.image {
            if let Err(e) = storage.check(image) {
                errors.add("image", e.to_string());
            }
            if self.clear_image {
                errors.add(
                    "image",
                    "Please either submit a file or check the clear checkbox, not both.",
                );
            }
        }

        errors.into_result(ValidPost {
            message: message.to_string(),
            image: self.image.clone(),
            clear_image: self.clear_image,
        })
    }
}

/// Profile form: picture and bio
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileForm {
    pub bio: String,
    #[serde(skip)]
    pub profile_picture: Option<Upload>,
}

/// Cleaned profile form data
#[derive(Debug, Clone)]
pub struct ValidProfile {
    pub bio: String,
    pub profile_picture: Option<Upload>,
}

impl ProfileForm {
    pub const MAX_BIO_CHARS: usize = 500;

    pub fn from_multipart(mut form: MultipartForm) -> Self {
        Self {
            bio: form.text("bio").unwrap_or_default().to_string(),
            profile_picture: form.take_file("profile_picture"),
        }
    }

    pub fn validate(&self, storage: &MediaStorage) -> Result<ValidProfile, FormErrors> {
        let mut errors = FormErrors::new();
        let bio = self.bio.trim();

        if bio.chars().count() > Self::MAX_BIO_CHARS {
            errors.add(
                "bio",
                format!(
                    "Ensure this value has at most {} characters.",
                    Self::MAX_BIO_CHARS
                ),
            );
        }

        if let Some(picture) = &self.profile_picture {
            if let Err(e) = storage.check(picture) {
                errors.add("profile_picture", e.to_string());
            }
        }

        errors.into_result(ValidProfile {
            bio: bio.to_string(),
            profile_picture: self.profile_picture.clone(),
        })
    }
}

fn is_checked(value: &str) -> bool {
    matches!(value, "on" | "true" | "1")
}
