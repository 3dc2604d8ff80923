//! HTML templates, compiled into the binary

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};
use tera::{Context, Tera, Value};

use crate::media::media_url;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("profile_edit.html", include_str!("../templates/profile_edit.html")),
    ("edit_post.html", include_str!("../templates/edit_post.html")),
    (
        "delete_post_confirm.html",
        include_str!("../templates/delete_post_confirm.html"),
    ),
    ("auth/login.html", include_str!("../templates/auth/login.html")),
    ("auth/register.html", include_str!("../templates/auth/register.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Template engine shared by all handlers
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    /// The template set, parsed on first use and shared afterwards
    pub fn new() -> tera::Result<Self> {
        static ENGINE: OnceLock<Arc<Tera>> = OnceLock::new();

        if let Some(tera) = ENGINE.get() {
            return Ok(Self {
                tera: Arc::clone(tera),
            });
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tera.register_filter("media_url", media_url_filter);

        Ok(Self {
            tera: Arc::clone(ENGINE.get_or_init(|| Arc::new(tera))),
        })
    }

    pub fn render(&self, name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(name, context)
    }
}

/// `{{ post.image | media_url }}`
fn media_url_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_str() {
        Some(reference) => Ok(Value::String(media_url(reference))),
        None => Err(tera::Error::msg(format!(
            "media_url expects a string, got {value}"
        ))),
    }
}
