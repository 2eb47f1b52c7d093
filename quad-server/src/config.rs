//! Environment-driven configuration.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Redis connection URL; the server requires the JSON module.
    pub redis_url: String,
    /// Key prefix isolating this deployment's data.
    pub key_prefix: String,
    /// Secret used to sign session tokens and the admin cookie. Has no
    /// default; startup fails when it is not provided.
    pub token_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("QUAD_PORT", "3001"),
            redis_url: try_load("QUAD_REDIS_URL", "redis://127.0.0.1/"),
            key_prefix: try_load("QUAD_KEY_PREFIX", "quadapp"),
            token_secret: require("QUAD_TOKEN_SECRET"),
            token_ttl_secs: try_load("QUAD_TOKEN_TTL_SECS", "604800"),
        }
    }
}

/// Secrets never fall back to a baked-in value; a missing one aborts startup
/// instead of leaving tokens signed with a guessable key.
fn require(key: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            warn!("{key} is not set");
            panic!("{key} must be set")
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    match raw.parse() {
        Ok(value) => value,
        Err(err) => panic!("invalid {key} value: {err}"),
    }
}
