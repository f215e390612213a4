use actix_web::cookie::Key;
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::security::DEFAULT_COST;

/// Server settings, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub session_key: Key,
    pub cookie_secure: bool,
    /// How long a successful `verify-password` stands in for a password.
    pub verification_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            database_path: PathBuf::from("./data/health_registry.db"),
            session_key: Key::generate(),
            cookie_secure: false,
            verification_ttl: Duration::from_secs(300),
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

impl AppConfig {
    /// Reads the environment (after `.env` is loaded), falling back to defaults.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid number, got {:?}", raw))?,
            Err(_) => defaults.port,
        };

        let verification_ttl = match env::var("VERIFICATION_TTL_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                format!("VERIFICATION_TTL_SECS must be a number of seconds, got {:?}", raw)
            })?),
            Err(_) => defaults.verification_ttl,
        };

        let session_key = match env::var("SESSION_SECRET_KEY") {
            Ok(secret) => Key::try_from(secret.as_bytes())
                .map_err(|_| "SESSION_SECRET_KEY must be at least 64 bytes long".to_string())?,
            Err(_) => {
                warn!("SESSION_SECRET_KEY not set; generating a random key. Sessions will not survive a restart.");
                defaults.session_key
            }
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            session_key,
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.cookie_secure),
            verification_ttl,
            bcrypt_cost: defaults.bcrypt_cost,
        })
    }
}

/// Client settings, injected into `ApiClient` at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub backend_base_url: String,
}

impl ClientConfig {
    pub fn new(backend_base_url: impl Into<String>) -> Self {
        Self {
            backend_base_url: backend_base_url.into(),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        env::var("BACKEND_BASE_URL")
            .map(Self::new)
            .map_err(|_| "BACKEND_BASE_URL must be set".to_string())
    }

    /// Joins an API path onto the base URL without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
