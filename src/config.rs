use anyhow::Context;
use serde::Deserialize;

/// Secrets shorter than this are refused at startup.
pub const MIN_SECRET_LEN: usize = 32;

const PLACEHOLDER_SECRETS: &[&str] = &["mysupersecret", "secret", "changeme"];

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Rejects secrets that would make tokens forgeable.
    pub fn validate(&self) -> anyhow::Result<()> {
        let secret = self.secret.trim();
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");
        anyhow::ensure!(
            !PLACEHOLDER_SECRETS.contains(&secret),
            "JWT_SECRET is a well-known placeholder value"
        );
        anyhow::ensure!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT_SECRET must be at least {} bytes",
            MIN_SECRET_LEN
        );
        anyhow::ensure!(self.ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = match lookup("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT is not a valid port")?,
            None => 8080,
        };
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "ginba".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "ginba-users".into()),
            ttl_minutes: lookup("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        jwt.validate()?;

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            jwt,
        })
    }
}
