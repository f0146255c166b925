//! Process configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_JWT_TTL_HOURS: i64 = 24;
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 366;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    /// JSON snapshot file; unset keeps state in memory only.
    pub data_file: Option<PathBuf>,
    pub seed_on_start: bool,
    pub admin_username: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_ttl: Duration::hours(DEFAULT_JWT_TTL_HOURS),
            data_file: None,
            seed_on_start: true,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present), then read the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Malformed values fall back to
    /// the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            defaults.jwt_secret.clone()
        });

        let ttl_hours = parse_or(get("JWT_TTL_HOURS"), "JWT_TTL_HOURS", DEFAULT_JWT_TTL_HOURS);
        let jwt_ttl = if ttl_hours <= 0 {
            tracing::warn!(ttl_hours, "JWT_TTL_HOURS must be positive; using default");
            defaults.jwt_ttl
        } else if ttl_hours > MAX_JWT_TTL_HOURS {
            tracing::warn!(ttl_hours, max = MAX_JWT_TTL_HOURS, "JWT_TTL_HOURS too large; clamped");
            Duration::try_hours(MAX_JWT_TTL_HOURS).unwrap_or(defaults.jwt_ttl)
        } else {
            Duration::try_hours(ttl_hours).unwrap_or(defaults.jwt_ttl)
        };

        let bcrypt_cost = parse_or(get("BCRYPT_COST"), "BCRYPT_COST", DEFAULT_BCRYPT_COST);
        let bcrypt_cost = if (4..=31).contains(&bcrypt_cost) {
            bcrypt_cost
        } else {
            tracing::warn!(bcrypt_cost, "BCRYPT_COST must be within 4..=31; using default");
            DEFAULT_BCRYPT_COST
        };

        Self {
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr),
            jwt_secret,
            jwt_ttl,
            data_file: get("DATA_FILE").map(PathBuf::from),
            seed_on_start: get("SEED_ON_START")
                .map(|v| parse_flag(&v, "SEED_ON_START", defaults.seed_on_start))
                .unwrap_or(defaults.seed_on_start),
            admin_username: get("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: get("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            bcrypt_cost,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %v, "malformed config value; using default");
            default
        }),
    }
}

fn parse_flag(raw: &str, key: &str, default: bool) -> bool {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(key, value = raw, "malformed flag; using default");
            default
        }
    }
}
