use std::env;
use std::str::FromStr;

use crate::services::OwnershipPolicy;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CONFLICT_RETRIES: u32 = 3;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the process keeps everything in memory.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub port: u16,
    /// Extra attempts after a booking or check-in loses a concurrent write.
    pub conflict_retries: u32,
    pub ownership_policy: OwnershipPolicy,
    pub cors_allowed_origins: String,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        let ownership_policy = if flag("STRICT_OWNERSHIP") {
            OwnershipPolicy::Strict
        } else {
            OwnershipPolicy::Permissive
        };

        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            conflict_retries: conflict_retries(&lookup),
            ownership_policy,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// At least one re-read is needed for a lost last-seat race to report `SoldOut`.
fn conflict_retries(lookup: &impl Fn(&str) -> Option<String>) -> u32 {
    let retries = parse_or(lookup, "BOOKING_CONFLICT_RETRIES", DEFAULT_CONFLICT_RETRIES);
    if retries == 0 {
        tracing::warn!("Config: BOOKING_CONFLICT_RETRIES must be at least 1, using 1");
    }
    retries.max(1)
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Config: ignoring invalid {}='{}'", key, raw);
            default
        }),
        None => default,
    }
}
