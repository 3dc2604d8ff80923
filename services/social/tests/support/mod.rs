//! Test harness: the full router over an in-memory database, driven with
//! `oneshot` and a tiny cookie jar

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use social::{AppConfig, AppState, build_app};
use std::io::Cursor;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "tender-lobster-42";

const BOUNDARY: &str = "murmur-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _media: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let media = tempfile::tempdir().expect("Failed to create media dir");
        let mut config = AppConfig::for_tests(media.path());
        configure(&mut config);

        let (app, state) = build_app(config).await.expect("Failed to build app");

        Self {
            app,
            state,
            _media: media,
        }
    }

    pub fn client(&self) -> Client {
        Client {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// A registered and logged-in client
    pub async fn signed_in(&self, username: &str) -> Client {
        let mut client = self.client();
        let response = client.register(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "registration of {username} failed");
        let response = client.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login of {username} failed");
        client
    }

    pub async fn user_id(&self, username: &str) -> Uuid {
        self.state
            .user_repository
            .find_by_username(username)
            .await
            .expect("User lookup failed")
            .expect("User not found")
            .id
    }

    pub async fn profile_id(&self, username: &str) -> Uuid {
        sqlx::query_scalar(
            "SELECT p.id FROM profiles p JOIN users u ON u.id = p.user_id WHERE u.username = ?",
        )
        .bind(username)
        .fetch_one(&self.state.db_pool)
        .await
        .expect("Profile not found")
    }

    pub async fn post_ids(&self, username: &str) -> Vec<Uuid> {
        sqlx::query_scalar(
            "SELECT p.id FROM posts p JOIN users u ON u.id = p.user_id WHERE u.username = ? ORDER BY p.rowid",
        )
        .bind(username)
        .fetch_all(&self.state.db_pool)
        .await
        .expect("Failed to list posts")
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(&self.state.db_pool)
            .await
            .expect("Count query failed")
    }
}

/// One browser: keeps the session cookie between requests
pub struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    pub fn is_anonymous(&self) -> bool {
        self.cookie.is_none()
    }

    pub async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Response {
        let builder = match &self.cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        };
        let request = builder.body(body).expect("Failed to build request");
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .expect("Cookie is ascii")
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            let expired = pair.ends_with('=');
            self.cookie = if expired { None } else { Some(pair) };
        }

        response
    }

    pub async fn get(&mut self, path: &str) -> Response {
        self.send(Request::get(path), Body::empty()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response {
        let body = serde_urlencoded::to_string(fields).expect("Failed to encode form");
        self.send(
            Request::post(path).header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    pub async fn post_multipart(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for file in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    file.field, file.file_name, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        self.send(
            Request::post(path).header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ),
            Body::from(body),
        )
        .await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Response {
        let email = format!("{username}@example.com");
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", email.as_str()),
                ("password1", password),
                ("password2", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Response {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn post_message(&mut self, message: &str) -> Response {
        self.post_multipart("/", &[("message", message)], &[]).await
    }

    /// GET a page that must render, and return its HTML
    pub async fn page(&mut self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        body_text(response).await
    }
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// A small but real PNG
pub fn png_bytes() -> Vec<u8> {
    let pixels = RgbImage::from_pixel(4, 4, Rgb([0xe6, 0x51, 0x00]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("Body is not utf-8")
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .expect("Response has no Location header")
        .to_str()
        .expect("Location is ascii")
}
