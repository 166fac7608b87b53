/**
 * Server Configuration
 *
 * This module loads the gateway configuration from environment variables
 * (after `.env` has been read by `main`) and opens the optional PostgreSQL
 * pool.
 *
 * # Variables
 *
 * | Variable                    | Default     | Meaning                                  |
 * |-----------------------------|-------------|------------------------------------------|
 * | `SERVER_HOST`               | `0.0.0.0`   | Bind address                             |
 * | `SERVER_PORT`               | `3000`      | Bind port                                |
 * | `JWT_SECRET`                | (required)  | HS256 signing secret                     |
 * | `SESSION_TTL_SECS`          | `3600`      | Token validity window                    |
 * | `SESSION_COOKIE`            | `session`   | Cookie carrying the token                |
 * | `SESSION_SWEEP_SECS`        | `60`        | Interval between expired-session purges  |
 * | `HANDSHAKE_TIMEOUT_SECS`    | `10`        | Max wait for the `setup` frame           |
 * | `OUTBOUND_BUFFER`           | `64`        | Per-connection outbound frame buffer     |
 * | `ENFORCE_THREAD_MEMBERSHIP` | `false`     | Check membership at handshake            |
 * | `DATABASE_URL`              | unset       | PostgreSQL; in-memory collaborators if unset |
 *
 * In debug builds a missing `JWT_SECRET` falls back to a development secret
 * with a warning. Release builds refuse to start without one.
 *
 * # Error Handling
 *
 * Malformed values are `ConfigError`s. A missing or unreachable database is
 * not an error: the server logs a warning and runs on in-memory
 * collaborators.
 */

use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

use crate::backend::gateway::handshake::MembershipPolicy;

const DEV_JWT_SECRET: &str = "threadline-development-secret";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub session_cookie: String,
    pub session_sweep_interval: Duration,
    pub handshake_timeout: Duration,
    pub outbound_buffer: usize,
    pub membership_policy: MembershipPolicy,
    pub database_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            session_ttl: Duration::from_secs(3600),
            session_cookie: "session".to_string(),
            session_sweep_interval: Duration::from_secs(60),
            handshake_timeout: Duration::from_secs(10),
            outbound_buffer: 64,
            membership_policy: MembershipPolicy::Disabled,
            database_url: None,
        }
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret.clone()
            }
            _ => return Err(ConfigError::MissingValue("JWT_SECRET")),
        };

        let enforce_membership: bool = parse_var("ENFORCE_THREAD_MEMBERSHIP", false)?;

        let config = Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_var("SERVER_PORT", defaults.port)?,
            jwt_secret,
            session_ttl: Duration::from_secs(parse_var("SESSION_TTL_SECS", 3600u64)?),
            session_cookie: std::env::var("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            session_sweep_interval: Duration::from_secs(parse_var("SESSION_SWEEP_SECS", 60u64)?),
            handshake_timeout: Duration::from_secs(parse_var("HANDSHAKE_TIMEOUT_SECS", 10u64)?),
            outbound_buffer: parse_var("OUTBOUND_BUFFER", defaults.outbound_buffer)?,
            membership_policy: if enforce_membership {
                MembershipPolicy::Enforced
            } else {
                MembershipPolicy::Disabled
            },
            database_url: std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS",
                value: "0".to_string(),
            });
        }
        if self.session_sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_SWEEP_SECS",
                value: "0".to_string(),
            });
        }
        if self.outbound_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                name: "OUTBOUND_BUFFER",
                value: "0".to_string(),
            });
        }
        if self.session_cookie.is_empty() {
            return Err(ConfigError::MissingValue("SESSION_COOKIE"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

/// Builder for GatewayConfig
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.config.session_ttl = ttl;
        self
    }

    pub fn session_sweep_interval(mut self, interval: Duration) -> Self {
        self.config.session_sweep_interval = interval;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn outbound_buffer(mut self, capacity: usize) -> Self {
        self.config.outbound_buffer = capacity;
        self
    }

    pub fn membership_policy(mut self, policy: MembershipPolicy) -> Self {
        self.config.membership_policy = policy;
        self
    }

    pub fn build(self) -> Result<GatewayConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Open the PostgreSQL pool if `DATABASE_URL` is configured
///
/// Returns `None` when no URL is set or the connection fails; the caller
/// then wires in-memory collaborators.
pub async fn load_database(config: &GatewayConfig) -> Option<PgPool> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using in-memory collaborators.");
        return None;
    };

    tracing::info!("Connecting to database...");

    match PgPool::connect(database_url).await {
        Ok(pool) => {
            tracing::info!("Database connection pool created successfully");
            Some(pool)
        }
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Using in-memory collaborators.");
            None
        }
    }
}
