use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub auth_issuer: String,
    pub upload_dir: PathBuf,
    pub upload_url_prefix: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    /// Recompute rent and total from the live listing on booking creation.
    pub verify_booking_totals: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 5000)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", 24 * 30)?,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "find-my-pg".to_string()),
            upload_dir: PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string())),
            upload_url_prefix: env::var("UPLOAD_URL_PREFIX").unwrap_or_else(|_| "/uploads".to_string()),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            verify_booking_totals: parsed("BOOKING_VERIFY_TOTALS", false)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
