use std::{env, net::SocketAddr, str::FromStr};

use chrono::Duration;
use tracing::info;

use crate::error::{config_error, Error};

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database: DatabaseConfig,
    pub market: MarketConfig,
    pub admin: Option<AdminConfig>,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Credit economy and session settings used by the engine.
#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub signup_credits: i32,
    pub platform_fee: i32,
    pub session_ttl: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            signup_credits: 20,
            platform_fee: 2,
            session_ttl: Duration::hours(168),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub email: String,
    pub pseudo: String,
    pub password: String,
}

impl Config {
    /// Reads `.env` when present, then the process environment.
    pub fn load() -> Result<Self, Error> {
        if dotenv::dotenv().is_ok() {
            info!("loaded .env file");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or_else(|| config_error("DATABASE_URL"))?;

        let database = DatabaseConfig {
            url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
        };

        let addr = parse_or(
            &lookup,
            "ECORIDE_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3000)),
        )?;

        let signup_credits: i32 = parse_or(&lookup, "ECORIDE_SIGNUP_CREDITS", 20)?;
        let platform_fee: i32 = parse_or(&lookup, "ECORIDE_PLATFORM_FEE", 2)?;
        let session_ttl_hours: i64 = parse_or(&lookup, "ECORIDE_SESSION_TTL_HOURS", 168)?;

        if signup_credits < 0 {
            return Err(config_error("ECORIDE_SIGNUP_CREDITS"));
        }
        if platform_fee < 0 {
            return Err(config_error("ECORIDE_PLATFORM_FEE"));
        }
        if session_ttl_hours <= 0 {
            return Err(config_error("ECORIDE_SESSION_TTL_HOURS"));
        }

        let admin = match (
            lookup("ECORIDE_ADMIN_EMAIL"),
            lookup("ECORIDE_ADMIN_PSEUDO"),
            lookup("ECORIDE_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(pseudo), Some(password)) => Some(AdminConfig {
                email,
                pseudo,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            addr,
            database,
            market: MarketConfig {
                signup_credits,
                platform_fee,
                session_ttl: Duration::hours(session_ttl_hours),
            },
            admin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| config_error(key)),
        None => {
            info!("{} not set, using default: {:?}", key, default);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_test() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap();

        assert_eq!(config.database.url, "postgres://x");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.market.signup_credits, 20);
        assert_eq!(config.market.platform_fee, 2);
        assert_eq!(config.market.session_ttl, Duration::hours(168));
        assert!(config.admin.is_none());
    }

    #[test]
    fn missing_database_url_test() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err().code, 5);
    }

    #[test]
    fn overrides_test() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("ECORIDE_ADDR", "0.0.0.0:8080"),
            ("ECORIDE_PLATFORM_FEE", " 3 "),
            ("ECORIDE_ADMIN_EMAIL", "admin@ecoride.fr"),
            ("ECORIDE_ADMIN_PSEUDO", "admin"),
            ("ECORIDE_ADMIN_PASSWORD", "changeme123"),
        ]))
        .unwrap();

        assert_eq!(config.database.max_connections, 12);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.market.platform_fee, 3);
        assert_eq!(config.admin.unwrap().pseudo, "admin");
    }

    #[test]
    fn invalid_values_test() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]));
        assert!(result.is_err());

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("ECORIDE_PLATFORM_FEE", "-1"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn partial_admin_is_ignored_test() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("ECORIDE_ADMIN_EMAIL", "admin@ecoride.fr"),
        ]))
        .unwrap();

        assert!(config.admin.is_none());
    }
}
