//! Daemon configuration
//!
//! Layered as: built-in defaults, then the TOML file, then environment and
//! command-line overrides (see [`Overrides`]).

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use gwm_mongo::MongoConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            request_timeout_secs: 30,
            log_format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub server_selection_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let mongo = MongoConfig::default();
        Self {
            backend: StoreBackend::Memory,
            uri: mongo.uri,
            database: mongo.database,
            collection: mongo.collection,
            server_selection_timeout_secs: mongo.server_selection_timeout.as_secs(),
        }
    }
}

/// Values supplied through the environment or the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub log_format: Option<LogFormat>,
    /// Setting a URI switches the backend to MongoDB
    pub mongo_uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(format) = overrides.log_format {
            self.server.log_format = format;
        }
        if let Some(uri) = overrides.mongo_uri {
            self.store.backend = StoreBackend::Mongodb;
            self.store.uri = uri;
        }
        if let Some(database) = overrides.database {
            self.store.database = database;
        }
        if let Some(collection) = overrides.collection {
            self.store.collection = collection;
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn mongo(&self) -> MongoConfig {
        MongoConfig {
            uri: self.store.uri.clone(),
            database: self.store.database.clone(),
            collection: self.store.collection.clone(),
            server_selection_timeout: Duration::from_secs(
                self.store.server_selection_timeout_secs,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.database, "gateway_manager");
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080
            log_format = "json"

            [store]
            backend = "mongodb"
            uri = "mongodb://db:27017"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.mongo().uri, "mongodb://db:27017");
        assert_eq!(config.mongo().collection, "gateways");
    }

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(include_str!("../../../config/gwmd.toml")).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Config::from_toml("[store]\nbackend = \"redis\"").is_err());
    }

    #[test]
    fn test_mongo_uri_override_selects_mongodb() {
        let mut config = Config::default();
        config.apply(Overrides {
            port: Some(4000),
            mongo_uri: Some("mongodb://other:27017".to_string()),
            collection: Some("gw".to_string()),
            ..Default::default()
        });

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.store.uri, "mongodb://other:27017");
        assert_eq!(config.store.collection, "gw");
        assert_eq!(config.store.database, "gateway_manager");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"\nport = 3100").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:3100");

        assert!(Config::from_file(Path::new("/nonexistent/gwmd.toml")).is_err());
    }
}
