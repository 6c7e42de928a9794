use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

/// Upstream distance-matrix API settings.
///
/// An empty `api_key` means the routing integration is unconfigured: the
/// service still starts, and distance resolution degrades to a
/// configuration-error result without attempting any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub endpoint: String,
    pub api_key: String,
    pub region: String,
    pub language: String,
    pub cache_ttl_days: i64,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./camionback.db".to_string(),
                max_connections: Some(10),
            },
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            routing: RoutingConfig {
                endpoint: "https://maps.googleapis.com/maps/api/distancematrix/json"
                    .to_string(),
                api_key: String::new(),
                region: "ma".to_string(),
                language: "fr".to_string(),
                cache_ttl_days: 30,
                timeout_secs: 10,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            default_config
        };

        // The routing credential is usually injected via the environment
        // rather than committed to the config file.
        if let Ok(key) = std::env::var("CAMIONBACK_ROUTING_API_KEY") {
            if !key.trim().is_empty() {
                config.routing.api_key = key;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_sqlite_and_moroccan_routing_hints() {
        let config = Config::default();
        assert!(config.database.url.starts_with("sqlite://"));
        assert_eq!(config.routing.region, "ma");
        assert_eq!(config.routing.language, "fr");
        assert_eq!(config.routing.cache_ttl_days, 30);
        assert!(config.routing.api_key.is_empty());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.web.port, config.web.port);
        assert_eq!(parsed.routing.endpoint, config.routing.endpoint);
    }
}
