use anyhow::Context;
use serde::Deserialize;

/// Signing and cookie settings for the session token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    /// Report every failed login with the same message.
    pub uniform_login_errors: bool,
}

const MIN_SECRET_LEN: usize = 32;
/// 366 days.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 366;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = lookup("SESSION_SECRET").context("SESSION_SECRET is not set")?;
        anyhow::ensure!(
            secret.len() >= MIN_SECRET_LEN,
            "SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes"
        );

        let ttl_minutes = parse_or(&lookup, "SESSION_TTL_MINUTES", 60 * 24 * 7)?;
        anyhow::ensure!(
            (1..=MAX_TTL_MINUTES).contains(&ttl_minutes),
            "SESSION_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}"
        );

        let session = SessionConfig {
            secret,
            issuer: lookup("SESSION_ISSUER").unwrap_or_else(|| "articlehub".into()),
            cookie_name: lookup("SESSION_COOKIE").unwrap_or_else(|| "session".into()),
            ttl_minutes,
            secure_cookie: flag(&lookup, "SESSION_COOKIE_SECURE"),
        };

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            run_migrations: flag(&lookup, "RUN_MIGRATIONS"),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            session,
            uniform_login_errors: flag(&lookup, "LOGIN_UNIFORM_ERRORS"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        None => Ok(default),
    }
}

fn flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
