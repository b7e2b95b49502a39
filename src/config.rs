use chrono::Duration;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::warn;

const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Access and refresh tokens must be signed with different secrets")]
    SharedSecret,
}

/// Signing secrets and lifetimes for the two token kinds
#[derive(Clone)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_secret: String,
    pub refresh_token_ttl: Duration,
    /// Adds the `Secure` attribute to session cookies; disable only for plain-http development
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn new(
        access_token_secret: impl Into<String>,
        access_token_ttl: Duration,
        refresh_token_secret: impl Into<String>,
        refresh_token_ttl: Duration,
    ) -> Result<Self, ConfigError> {
        let access_token_secret = access_token_secret.into();
        let refresh_token_secret = refresh_token_secret.into();

        if access_token_secret == refresh_token_secret {
            return Err(ConfigError::SharedSecret);
        }

        Ok(Self {
            access_token_secret,
            access_token_ttl,
            refresh_token_secret,
            refresh_token_ttl,
            secure_cookies: true,
        })
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("secure_cookies", &self.secure_cookies)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub cors_origin: Option<String>,
}

/// Full application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests don't touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let bind_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "BIND_ADDRESS",
                value: host.clone(),
            })?;

        let access_token_secret = lookup("ACCESS_TOKEN_SECRET").unwrap_or_else(|| {
            warn!("ACCESS_TOKEN_SECRET not set, using development secret");
            DEV_ACCESS_SECRET.to_string()
        });
        let refresh_token_secret = lookup("REFRESH_TOKEN_SECRET").unwrap_or_else(|| {
            warn!("REFRESH_TOKEN_SECRET not set, using development secret");
            DEV_REFRESH_SECRET.to_string()
        });

        let access_minutes: i64 = parse_or(&lookup, "ACCESS_TOKEN_EXPIRY_MINUTES", 15)?;
        let refresh_days: i64 = parse_or(&lookup, "REFRESH_TOKEN_EXPIRY_DAYS", 10)?;
        let secure_cookies: bool = parse_or(&lookup, "COOKIE_SECURE", true)?;

        let auth = AuthConfig::new(
            access_token_secret,
            Duration::minutes(access_minutes),
            refresh_token_secret,
            Duration::days(refresh_days),
        )?
        .with_secure_cookies(secure_cookies);

        Ok(Self {
            server: ServerConfig {
                bind_addr,
                database_url: lookup("DATABASE_URL"),
                cors_origin: lookup("CORS_ORIGIN"),
            },
            auth,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}
