//! Session keys and session layer construction

use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::config::AppConfig;

/// Id of the logged-in user
pub const USER_ID: &str = "user_id";

/// Pending one-shot messages
pub const MESSAGES: &str = "_messages";

/// Cookie-backed sessions kept in process memory
pub fn session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name("murmur_session")
        .with_secure(config.session_secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            config.session_inactivity_minutes,
        )))
}
