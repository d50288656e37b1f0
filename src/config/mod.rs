use serde::Serialize;
use std::env;
use thiserror::Error;

use crate::database::DatabaseManager;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    #[serde(skip)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterConfig {
    /// Upper bound on page size; `None` applies no cap
    pub max_limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip)]
    pub url: String,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig").field("jwt_secret", &"<redacted>").finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Profile defaults first, then specific overrides
        let (max_connections, connection_timeout, enable_query_logging) = match environment {
            Environment::Production => (50, 5, false),
            Environment::Staging => (20, 10, true),
            Environment::Development => (10, 30, true),
        };

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = get("DB_HOST").unwrap_or_else(|| "localhost".to_string());
                let port = parse_or("DB_PORT", get("DB_PORT"), 5432u16)?;
                let name = get("DB_NAME").unwrap_or_else(|| "trackmybugs".to_string());
                let user = get("DB_USER").unwrap_or_else(|| "postgres".to_string());
                let password = get("DB_PASSWORD");
                DatabaseManager::build_connection_string(&host, port, &name, &user, password.as_deref())
                    .map_err(|_| ConfigError::Invalid { key: "DB_HOST", value: host })?
            }
        };

        let database = DatabaseConfig {
            url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), max_connections)?,
            connection_timeout: parse_or("DATABASE_CONNECTION_TIMEOUT", get("DATABASE_CONNECTION_TIMEOUT"), connection_timeout)?,
            enable_query_logging: parse_or("DATABASE_ENABLE_QUERY_LOGGING", get("DATABASE_ENABLE_QUERY_LOGGING"), enable_query_logging)?,
        };

        let api = ApiConfig {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 8080u16)?,
        };

        let security = SecurityConfig {
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
        };

        let filter = FilterConfig {
            max_limit: get("FILTER_MAX_LIMIT")
                .map(|v| {
                    v.parse::<i64>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ConfigError::Invalid { key: "FILTER_MAX_LIMIT", value: v })
                })
                .transpose()?,
        };

        Ok(Self { environment, filter, database, api, security })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.filter.max_limit, None);
        assert_eq!(config.database.url, "postgres://postgres@localhost:5432/trackmybugs");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::from_lookup(lookup(&[("APP_ENV", "production"), ("JWT_SECRET", "s")])).unwrap();
        assert!(config.is_production());
        assert_eq!(config.database.max_connections, 50);
        assert!(!config.database.enable_query_logging);
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn database_url_wins_over_parts() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://u:p@db/app"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.database.url, "postgres://u:p@db/app");
    }

    #[test]
    fn database_parts_are_assembled() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "bugs"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert_eq!(config.database.url, "postgres://app:pw@db.internal:6543/bugs");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("PORT", "9000"),
            ("FILTER_MAX_LIMIT", "100"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.filter.max_limit, Some(100));
        assert_eq!(config.database.max_connections, 3);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("FILTER_MAX_LIMIT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FILTER_MAX_LIMIT", .. }));
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "hunter2")])).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
