// config/mod.rs - runtime settings
//
// A preset is chosen by APP_ENV (development, staging, production), then any
// individual variable below overrides it. Values that fail to parse keep the
// preset value.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// YAML list of entity declarations served next to the built-in `User`
    pub entities_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 30, max_limit: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret expected in `X-Access-Token`; empty rejects every request
    pub access_token: String,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

const MB: usize = 1024 * 1024;

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = Environment::from_name(lookup("APP_ENV").as_deref());
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.apply_overrides(&lookup);
        config
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        // Server
        if let Some(v) = lookup("GATEWAY_HOST") {
            self.server.host = v;
        }
        set_parsed(&mut self.server.port, lookup("PORT"));
        set_parsed(&mut self.server.port, lookup("GATEWAY_PORT"));
        if let Some(v) = lookup("GATEWAY_ENTITIES_FILE") {
            self.server.entities_file = Some(PathBuf::from(v));
        }

        // Pagination
        set_parsed(&mut self.pagination.default_limit, lookup("PAGINATION_DEFAULT_LIMIT"));
        set_parsed(&mut self.pagination.max_limit, lookup("PAGINATION_MAX_LIMIT"));

        // API
        set_parsed(&mut self.api.enable_request_logging, lookup("API_ENABLE_REQUEST_LOGGING"));
        set_parsed(&mut self.api.max_request_size_bytes, lookup("API_MAX_REQUEST_SIZE_BYTES"));

        // Security
        if let Some(v) = lookup("GATEWAY_ACCESS_TOKEN") {
            self.security.access_token = v;
        }
        set_parsed(&mut self.security.bcrypt_cost, lookup("SECURITY_BCRYPT_COST"));
        set_parsed(&mut self.security.enable_cors, lookup("SECURITY_ENABLE_CORS"));
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    /// Shared shape of every preset.
    fn preset(environment: Environment, max_request_size_bytes: usize, cors_origins: &[&str]) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                entities_file: None,
            },
            pagination: PaginationConfig::default(),
            api: ApiConfig {
                enable_request_logging: environment != Environment::Production,
                max_request_size_bytes,
            },
            security: SecurityConfig {
                access_token: String::new(),
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: environment != Environment::Production,
                cors_origins: cors_origins.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    pub fn development() -> Self {
        let mut config = Self::preset(
            Environment::Development,
            10 * MB,
            &["http://localhost:3000", "http://localhost:5173"],
        );
        config.server.host = "127.0.0.1".to_string();
        config
    }

    pub fn staging() -> Self {
        Self::preset(Environment::Staging, 5 * MB, &["https://staging.example.com"])
    }

    pub fn production() -> Self {
        Self::preset(Environment::Production, 2 * MB, &["https://app.example.com"])
    }
}

fn set_parsed<T: FromStr>(target: &mut T, raw: Option<String>) {
    let Some(raw) = raw else { return };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!("Ignoring unparsable configuration value '{}'", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn development_is_the_default_preset() {
        let config = config_with(&[]);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.pagination.default_limit, 30);
        assert_eq!(config.pagination.max_limit, 100);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn production_preset_is_quiet_and_closed() {
        let config = config_with(&[("APP_ENV", "prod")]);
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.api.enable_request_logging);
        assert!(!config.security.enable_cors);
        assert!(config.security.access_token.is_empty());
    }

    #[test]
    fn variables_override_the_preset() {
        let config = config_with(&[
            ("APP_ENV", "staging"),
            ("PORT", "8080"),
            ("GATEWAY_PORT", "9090"),
            ("GATEWAY_ACCESS_TOKEN", "secret"),
            ("PAGINATION_MAX_LIMIT", "50"),
            ("SECURITY_CORS_ORIGINS", "https://a.test, ,https://b.test"),
        ]);
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.security.access_token, "secret");
        assert_eq!(config.pagination.max_limit, 50);
        assert_eq!(config.security.cors_origins, ["https://a.test", "https://b.test"]);
    }

    #[test]
    fn unparsable_values_keep_the_preset() {
        let config = config_with(&[("GATEWAY_PORT", "eighty"), ("SECURITY_ENABLE_CORS", "maybe")]);
        assert_eq!(config.server.port, 3000);
        assert!(config.security.enable_cors);
    }
}
