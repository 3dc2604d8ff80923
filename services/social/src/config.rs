//! Service configuration

use anyhow::Result;
use common::database::DatabaseConfig;
use std::{env, path::PathBuf, str::FromStr};

use crate::models::FollowPolicy;

/// Social service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Directory uploaded images are written to
    pub media_root: PathBuf,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
    /// Idle time after which a session expires
    pub session_inactivity_minutes: i64,
    /// Only send the session cookie over HTTPS
    pub session_secure_cookie: bool,
    pub self_follow: FollowPolicy,
}

impl AppConfig {
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDRESS`: listen address (default: "0.0.0.0:3000")
    /// - `MEDIA_ROOT`: upload directory (default: "./media")
    /// - `MAX_UPLOAD_BYTES`: upload size limit (default: 5242880)
    /// - `SESSION_INACTIVITY_MINUTES`: session idle expiry (default: 120)
    /// - `SESSION_SECURE_COOKIE`: `true` to mark the cookie secure (default: false)
    /// - `SELF_FOLLOW`: `forbid` or `allow` (default: forbid)
    ///
    /// Database settings are read by [`DatabaseConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let database = DatabaseConfig::from_env()?;

        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let media_root = env::var("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./media"));

        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES").unwrap_or(Self::DEFAULT_MAX_UPLOAD_BYTES);

        let session_inactivity_minutes = parse_var("SESSION_INACTIVITY_MINUTES")
            .filter(|minutes: &i64| *minutes > 0)
            .unwrap_or(120);

        let session_secure_cookie = parse_var("SESSION_SECURE_COOKIE").unwrap_or(false);

        let self_follow = match env::var("SELF_FOLLOW") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SELF_FOLLOW: {}", e))?,
            Err(_) => FollowPolicy::default(),
        };

        Ok(Self {
            database,
            bind_address,
            media_root,
            max_upload_bytes,
            session_inactivity_minutes,
            session_secure_cookie,
            self_follow,
        })
    }

    /// Configuration for tests: in-memory database, media under `media_root`
    pub fn for_tests(media_root: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseConfig::in_memory(),
            bind_address: "127.0.0.1:0".to_string(),
            media_root: media_root.into(),
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
            session_inactivity_minutes: 120,
            session_secure_cookie: false,
            self_follow: FollowPolicy::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "BIND_ADDRESS",
        "MEDIA_ROOT",
        "MAX_UPLOAD_BYTES",
        "SESSION_INACTIVITY_MINUTES",
        "SESSION_SECURE_COOKIE",
        "SELF_FOLLOW",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_app_config_defaults() {
        clear_env();

        let config = AppConfig::from_env().expect("Failed to create app config");
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.media_root, PathBuf::from("./media"));
        assert_eq!(config.max_upload_bytes, 5_242_880);
        assert_eq!(config.session_inactivity_minutes, 120);
        assert!(!config.session_secure_cookie);
        assert_eq!(config.self_follow, FollowPolicy::Forbid);
    }

    #[test]
    #[serial]
    fn test_app_config_custom_values() {
        clear_env();
        unsafe {
            env::set_var("BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("MAX_UPLOAD_BYTES", "1024");
            env::set_var("SESSION_INACTIVITY_MINUTES", "-5");
            env::set_var("SESSION_SECURE_COOKIE", "true");
            env::set_var("SELF_FOLLOW", "ALLOW");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.session_inactivity_minutes, 120);
        assert!(config.session_secure_cookie);
        assert_eq!(config.self_follow, FollowPolicy::Allow);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_self_follow_policy_is_rejected() {
        clear_env();
        unsafe { env::set_var("SELF_FOLLOW", "sometimes") };

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("SELF_FOLLOW"));

        clear_env();
    }
}
