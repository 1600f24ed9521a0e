//! Process configuration
//!
//! Read once at startup into [`AppConfig`] and handed to whatever needs it.

use std::time::Duration;

use anyhow::{Context, bail};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;
const DEFAULT_CONNECT_DELAY_SECS: u64 = 2;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("APP_ENV must be development or production, got {other:?}"),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub environment: Environment,
    pub frontend_origins: Vec<String>,
    pub connect_attempts: u32,
    pub connect_delay: Duration,
    /// Only read by the `seed` subcommand
    pub seed_admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => compose_database_url(&get)?,
        };

        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;

        let port = match get("APP_PORT") {
            Some(raw) => raw.parse().context("APP_PORT must be a port number")?,
            None => DEFAULT_PORT,
        };

        let environment = Environment::parse(&get("APP_ENV").unwrap_or_default())?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let connect_attempts = match get("DB_CONNECT_ATTEMPTS") {
            Some(raw) => raw
                .parse()
                .context("DB_CONNECT_ATTEMPTS must be a positive integer")?,
            None => DEFAULT_CONNECT_ATTEMPTS,
        };

        let connect_delay = match get("DB_CONNECT_DELAY_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .context("DB_CONNECT_DELAY_SECS must be a number of seconds")?,
            ),
            None => Duration::from_secs(DEFAULT_CONNECT_DELAY_SECS),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            port,
            environment,
            frontend_origins,
            connect_attempts,
            connect_delay,
            seed_admin_password: get("SEED_ADMIN_PASSWORD"),
        })
    }
}

fn compose_database_url(get: &impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let require = |key: &str| get(key).with_context(|| format!("DATABASE_URL or {key} must be set"));

    let user = require("DB_USER")?;
    let password = require("DB_PASSWORD")?;
    let host = require("DB_HOST")?;
    let port = get("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let name = require("DB_NAME")?;

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}
