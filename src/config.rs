//! Configuration loading from TOML files
//!
//! # Example
//!
//! ```rust,ignore
//! use drinks_api::config::load_config;
//!
//! let config = load_config("config.toml")?;
//! let rs_config = config.auth.to_resource_server_config()?;
//! ```

use crate::error::{ApiError, Result};
use crate::oidc::types::ResourceServerConfig;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_config(path)
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        if self.database.url.trim().is_empty() {
            return Err(ApiError::Config("database.url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ApiError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. "tenant.auth0.com"
    pub domain: String,

    /// Expected audience of access tokens
    pub audience: String,

    /// Accepted signing algorithms
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<String>,

    /// Override for the key set location (defaults to the domain's well-known URL)
    #[serde(default)]
    pub jwks_url: Option<String>,

    /// Seconds a fetched key set is reused; 0 fetches on every request
    #[serde(default = "default_jwks_cache_ttl_secs")]
    pub jwks_cache_ttl_secs: u64,

    /// Minimum age in seconds of a cached key set before an unknown key id
    /// triggers a refetch
    #[serde(default = "default_jwks_min_refresh_secs")]
    pub jwks_min_refresh_secs: u64,

    /// Timeout for the key set request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(ApiError::Config("auth.domain must not be empty".to_string()));
        }
        if self.domain.contains("://") || self.domain.ends_with('/') {
            return Err(ApiError::Config(format!(
                "auth.domain must be a bare host name, got '{}'",
                self.domain
            )));
        }
        if self.audience.trim().is_empty() {
            return Err(ApiError::Config("auth.audience must not be empty".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(ApiError::Config("auth.http_timeout_secs must be at least 1".to_string()));
        }
        self.parsed_algorithms().map(|_| ())
    }

    /// Parse the algorithm list; only RS256 is accepted
    pub fn parsed_algorithms(&self) -> Result<Vec<Algorithm>> {
        if self.algorithms.is_empty() {
            return Err(ApiError::Config("auth.algorithms must not be empty".to_string()));
        }
        self.algorithms
            .iter()
            .map(|name| {
                let alg = Algorithm::from_str(name)
                    .map_err(|_| ApiError::Config(format!("unknown signing algorithm '{}'", name)))?;
                if alg != Algorithm::RS256 {
                    return Err(ApiError::Config(format!(
                        "signing algorithm '{}' is not supported, use RS256",
                        name
                    )));
                }
                Ok(alg)
            })
            .collect()
    }

    /// Convert to ResourceServerConfig for use with ResourceServer
    pub fn to_resource_server_config(&self) -> Result<ResourceServerConfig> {
        let mut config = ResourceServerConfig::for_domain(&self.domain, &self.audience);
        if let Some(jwks_url) = &self.jwks_url {
            config.jwks_url = jwks_url.clone();
        }
        config.algorithms = self.parsed_algorithms()?;
        config.jwks_cache_ttl = Duration::from_secs(self.jwks_cache_ttl_secs);
        config.jwks_min_refresh_interval = Duration::from_secs(self.jwks_min_refresh_secs);
        config.http_timeout = Duration::from_secs(self.http_timeout_secs);
        Ok(config)
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_database_url() -> String {
    "sqlite://database.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}

fn default_jwks_cache_ttl_secs() -> u64 {
    300
}

fn default_jwks_min_refresh_secs() -> u64 {
    30
}

fn default_http_timeout_secs() -> u64 {
    5
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ApiError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| ApiError::Config(format!("Failed to parse TOML config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml_str = r#"
[auth]
domain = "myfsnd.auth0.com"
audience = "coffee"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.database.url, "sqlite://database.db");
        assert_eq!(config.auth.algorithms, vec!["RS256"]);
        assert_eq!(config.auth.jwks_cache_ttl_secs, 300);
        assert_eq!(config.auth.jwks_min_refresh_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:8080"

[database]
url = "sqlite::memory:"
max_connections = 1

[auth]
domain = "myfsnd.auth0.com"
audience = "coffee"
algorithms = ["RS256"]
jwks_url = "http://localhost:9999/jwks.json"
jwks_cache_ttl_secs = 0
jwks_min_refresh_secs = 10
http_timeout_secs = 2
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 1);

        let rs = config.auth.to_resource_server_config().unwrap();
        assert_eq!(rs.jwks_url, "http://localhost:9999/jwks.json");
        assert_eq!(rs.issuer, "https://myfsnd.auth0.com/");
        assert_eq!(rs.audience, "coffee");
        assert_eq!(rs.jwks_cache_ttl, Duration::ZERO);
        assert_eq!(rs.jwks_min_refresh_interval, Duration::from_secs(10));
        assert_eq!(rs.http_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_default_jwks_url_from_domain() {
        let toml_str = r#"
[auth]
domain = "myfsnd.auth0.com"
audience = "coffee"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let rs = config.auth.to_resource_server_config().unwrap();
        assert_eq!(rs.jwks_url, "https://myfsnd.auth0.com/.well-known/jwks.json");
    }

    #[test]
    fn test_missing_auth_section() {
        let result: std::result::Result<AppConfig, _> = toml::from_str("[server]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_rs256_algorithms() {
        let toml_str = r#"
[auth]
domain = "myfsnd.auth0.com"
audience = "coffee"
algorithms = ["HS256"]
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.validate(), Err(ApiError::Config(_))));

        let mut config = config;
        config.auth.algorithms = vec!["nonsense".to_string()];
        assert!(config.validate().is_err());

        config.auth.algorithms = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_domain_and_audience() {
        let mut config: AppConfig = toml::from_str(
            r#"
[auth]
domain = "https://myfsnd.auth0.com/"
audience = "coffee"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        config.auth.domain = "myfsnd.auth0.com".to_string();
        config.auth.audience = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/drinks.toml").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
