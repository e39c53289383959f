use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Context};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: String,
    pub max_connections: u32,
    pub session_idle_minutes: i64,
    /// Shared with the identity provider, which must send it in
    /// [`SESSION_SECRET_HEADER`] to open a session. Unset disables login.
    pub session_secret: Option<String>,
    /// Seeded as an admin account at startup if no user has this email yet.
    pub admin_email: Option<String>,
}

pub const SESSION_SECRET_HEADER: &str = "x-session-secret";

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gigboard.db".to_owned(),
            addr: "0.0.0.0:8080".to_owned(),
            max_connections: 16,
            session_idle_minutes: 60,
            session_secret: None,
            admin_email: None,
        }
    }
}

impl Config {
    /// Reads the process environment, falling back to `.env` and then to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            database_url: try_load("DATABASE_URL", defaults.database_url)?,
            addr: try_load("GIGBOARD_ADDR", defaults.addr)?,
            max_connections: try_load("GIGBOARD_MAX_CONNECTIONS", defaults.max_connections)?,
            session_idle_minutes: try_load("GIGBOARD_SESSION_IDLE_MINUTES", defaults.session_idle_minutes)?,
            session_secret: try_load_opt("GIGBOARD_SESSION_SECRET"),
            admin_email: try_load_opt("GIGBOARD_ADMIN_EMAIL"),
        };

        if config.max_connections == 0 {
            return Err(anyhow!("GIGBOARD_MAX_CONNECTIONS must be at least 1"));
        }
        if config.session_idle_minutes <= 0 {
            return Err(anyhow!("GIGBOARD_SESSION_IDLE_MINUTES must be positive"));
        }
        if config.session_secret.is_none() {
            warn!("GIGBOARD_SESSION_SECRET not set, session login is disabled");
        }

        Ok(config)
    }

    pub fn session_idle(&self) -> time::Duration {
        time::Duration::minutes(self.session_idle_minutes)
    }
}

fn try_load<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(key) {
        Ok(raw) => parse(key, &raw),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn try_load_opt(key: &str) -> Option<String> {
    dotenv::var(key)
        .ok()
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

fn parse<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid {key} value: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_values() {
        let err = parse::<u32>("GIGBOARD_MAX_CONNECTIONS", "sixteen").unwrap_err();
        assert!(err.to_string().contains("GIGBOARD_MAX_CONNECTIONS"));
        assert_eq!(parse::<u32>("GIGBOARD_MAX_CONNECTIONS", " 8 ").unwrap(), 8);
    }

    #[test]
    fn falls_back_to_default() {
        let v: u32 = try_load("GIGBOARD_TEST_SURELY_UNSET", 7).unwrap();
        assert_eq!(v, 7);
    }
}
