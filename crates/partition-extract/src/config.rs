//! Source connection configuration types.
//!
//! Only the types live here: partitions arrive at workers with their
//! connection descriptor already resolved, so file/environment loading is the
//! orchestrator's concern.

use serde::{Deserialize, Serialize};

/// Source database connection configuration.
///
/// One `extract` call turns this into exactly one connection, owned for the
/// lifetime of the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// SSL mode: disable, require, verify-ca, verify-full (default: "require").
    #[serde(default = "default_ssl_mode")]
    pub ssl_mode: String,
}

impl SourceConfig {
    /// Convenience constructor for examples and tests: connects to `host`
    /// with the given database name, default port, and TLS required.
    pub fn default_for_host(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            database: database.into(),
            user: String::new(),
            password: String::new(),
            ssl_mode: default_ssl_mode(),
        }
    }

    /// Redacted endpoint string for logging.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

// Default value functions for serde

fn default_port() -> u16 {
    5432
}

fn default_ssl_mode() -> String {
    "require".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let config: SourceConfig = serde_json::from_str(
            r#"{"host": "db", "database": "app", "user": "u", "password": "p"}"#,
        )
        .unwrap();
        assert_eq!(config.port, 5432);
        assert_eq!(config.ssl_mode, "require");
    }

    #[test]
    fn test_endpoint_omits_credentials() {
        let mut config = SourceConfig::default_for_host("db", "app");
        config.password = "secret".into();
        assert_eq!(config.endpoint(), "db:5432/app");
        assert!(!config.endpoint().contains("secret"));
    }
}
