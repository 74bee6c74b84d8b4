//! Runtime configuration, read from the environment (and `.env` via dotenv).

use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/league.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Default tracing filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "league_backend=info,tower_http=info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unparseable values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("LEAGUE_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid LEAGUE_PORT value {:?}", raw);
                defaults.port
            }),
            None => defaults.port,
        };

        Self {
            database_url: lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.database_url),
            host: lookup("LEAGUE_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port,
        }
    }

    pub fn bind_address(&self, port_override: Option<u16>) -> String {
        format!("{}:{}", self.host, port_override.unwrap_or(self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.database_url, "sqlite:data/league.db");
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(None), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides_and_bad_port() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("LEAGUE_HOST", "127.0.0.1"),
            ("LEAGUE_PORT", "not-a-port"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(Some(8081)), "127.0.0.1:8081");
    }
}
