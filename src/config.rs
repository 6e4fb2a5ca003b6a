//! Runtime settings loaded from the environment.
//!
//! `main` calls `dotenvy::dotenv()` first, so a local `.env` file is merged
//! into the process environment before [`Settings::from_env`] runs.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::util::normalize_currency;

pub const DEFAULT_BASE_CURRENCY: &str = "CAD";
pub const DEFAULT_EXCHANGE_API_BASE: &str = "https://api.exchangerate.host";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set. Add it to your .env file.")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// sqlx connection string, e.g. `sqlite://expenses.db?mode=rwc`.
    pub database_url: String,
    /// Currency every expense is normalized into.
    pub base_currency: String,
    /// Currency assumed when a create request omits one.
    pub default_currency: String,
    pub exchange_api_base: String,
    /// Credential for the FX API. `None` selects the unauthenticated `/latest` endpoint.
    pub exchange_api_key: Option<String>,
    pub server_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let base_currency = currency_var("BASE_CURRENCY", get("BASE_CURRENCY"))?;
        let default_currency = currency_var("DEFAULT_CURRENCY", get("DEFAULT_CURRENCY"))?;

        let exchange_api_base = get("EXCHANGE_API_BASE")
            .unwrap_or_else(|| DEFAULT_EXCHANGE_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let raw_addr = get("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());
        let server_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "SERVER_ADDR",
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            None => DEFAULT_DB_MAX_CONNECTIONS,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_MAX_CONNECTIONS",
                        value: raw,
                        reason: "expected a positive integer".into(),
                    })
                }
            },
        };

        Ok(Self {
            database_url,
            base_currency,
            default_currency,
            exchange_api_base,
            exchange_api_key: get("API_KEY"),
            server_addr,
            cors_origins,
            db_max_connections,
        })
    }
}

fn currency_var(name: &'static str, raw: Option<String>) -> Result<String, ConfigError> {
    let raw = raw.unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
    normalize_currency(&raw).ok_or_else(|| ConfigError::Invalid {
        name,
        value: raw,
        reason: "expected a 3 to 8 character currency code".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn database_url_is_required() {
        let err = settings(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let err = settings(&[("DATABASE_URL", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn defaults_apply() {
        let s = settings(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(s.base_currency, "CAD");
        assert_eq!(s.default_currency, "CAD");
        assert_eq!(s.exchange_api_base, DEFAULT_EXCHANGE_API_BASE);
        assert_eq!(s.exchange_api_key, None);
        assert_eq!(s.server_addr.to_string(), DEFAULT_SERVER_ADDR);
        assert_eq!(s.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(s.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    }

    #[test]
    fn values_are_normalized() {
        let s = settings(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("BASE_CURRENCY", "usd"),
            ("EXCHANGE_API_BASE", "http://fx.local/"),
            ("API_KEY", ""),
            ("CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ])
        .unwrap();
        assert_eq!(s.base_currency, "USD");
        assert_eq!(s.exchange_api_base, "http://fx.local");
        assert_eq!(s.exchange_api_key, None);
        assert_eq!(s.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = settings(&[("DATABASE_URL", "x"), ("BASE_CURRENCY", "C")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BASE_CURRENCY", .. }));

        let err = settings(&[("DATABASE_URL", "x"), ("SERVER_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SERVER_ADDR", .. }));

        let err = settings(&[("DATABASE_URL", "x"), ("DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. }));
    }
}
