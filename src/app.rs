use axum::Router;
use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use tracing::info;

use crate::{
    adapters::{
        inbound::http::router::{create_router, ApiSettings, AppState},
        outbound::storage::{
            memory::{InMemoryStore, MemoryConnector},
            s3::{AddressingStyle, S3Config, S3Connector},
        },
    },
    domain::value_objects::Delimiter,
    ports::storage::UpstreamConnector,
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub delimiter: Delimiter,
    pub api_path: String,
    pub instance_id: String,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            storage_backend: StorageBackend::InMemory,
            delimiter: Delimiter::default(),
            api_path: "/api".to_string(),
            instance_id: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Upstream the mediator talks to
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    S3(S3Config),
}

impl AppConfig {
    /// Read the configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = AppConfig::default();

        let storage_backend = match env("STORAGE_BACKEND").as_deref() {
            None | Some("memory") => StorageBackend::InMemory,
            Some("s3") => {
                let endpoint = env("S3_ENDPOINT").ok_or_else(|| AppError::Configuration {
                    message: "S3_ENDPOINT environment variable required".to_string(),
                })?;
                let mut config = S3Config::new(endpoint);
                if let Some(region) = env("S3_REGION") {
                    config.region = region;
                }
                if let Some(style) = env("S3_ADDRESSING_STYLE") {
                    config.addressing_style = parse_setting("S3_ADDRESSING_STYLE", &style)?;
                }
                StorageBackend::S3(config)
            }
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown storage backend: {}", other),
                })
            }
        };

        let delimiter = match env("S3_PREFIX_DELIMITER") {
            Some(delimiter) => Delimiter::new(delimiter).map_err(|e| AppError::Configuration {
                message: format!("S3_PREFIX_DELIMITER: {}", e),
            })?,
            None => defaults.delimiter,
        };

        let request_timeout = match env("REQUEST_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(parse_setting("REQUEST_TIMEOUT_SECS", &secs)?),
            None => defaults.request_timeout,
        };

        let mut config = AppConfig {
            host: env("SERVER_HOST").unwrap_or(defaults.host),
            port: match env("SERVER_PORT") {
                Some(port) => parse_setting("SERVER_PORT", &port)?,
                None => defaults.port,
            },
            storage_backend,
            delimiter,
            api_path: env("API_PATH").unwrap_or(defaults.api_path),
            instance_id: env("INSTANCE_ID").unwrap_or(defaults.instance_id),
            request_timeout,
        };
        config.apply_timeout();
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Configuration {
                message: format!("Invalid listen address {}:{}: {}", self.host, self.port, e),
            })
    }

    /// Upstream calls share the request timeout
    fn apply_timeout(&mut self) {
        if let StorageBackend::S3(s3) = &mut self.storage_backend {
            s3.request_timeout = self.request_timeout;
        }
    }

    fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            api_path: self.api_path.clone(),
            delimiter: self.delimiter.clone(),
            instance_id: self.instance_id.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_setting<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| AppError::Configuration {
        message: format!("{}: {}", name, e),
    })
}

/// Wired application, ready to serve
pub struct App {
    pub config: AppConfig,
    pub state: AppState,
}

impl App {
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    connector: Option<Arc<dyn UpstreamConnector>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            connector: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.config.api_path = api_path.into();
        self
    }

    /// Use `connector` instead of building one from the storage backend
    pub fn with_connector(mut self, connector: Arc<dyn UpstreamConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn build(self) -> Result<App, AppError> {
        let mut config = self.config;
        config.apply_timeout();

        let connector = match self.connector {
            Some(connector) => connector,
            None => create_connector(&config.storage_backend)?,
        };

        let state = AppState::new(connector, config.api_settings());
        Ok(App { config, state })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn create_connector(backend: &StorageBackend) -> Result<Arc<dyn UpstreamConnector>, AppError> {
    match backend {
        StorageBackend::InMemory => {
            info!("Using in-memory upstream");
            Ok(Arc::new(MemoryConnector::new(InMemoryStore::new())))
        }
        StorageBackend::S3(s3) => {
            info!(endpoint = %s3.endpoint, region = %s3.region, "Using S3 upstream");
            let connector = S3Connector::new(s3).map_err(|e| AppError::StorageInit {
                message: e.to_string(),
            })?;
            Ok(Arc::new(connector))
        }
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Create an application backed by the in-memory upstream
pub fn create_in_memory_app() -> Result<App, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory)
        .build()
}

/// Create an application against an S3-compatible endpoint
pub fn create_s3_app(
    endpoint: impl Into<String>,
    region: impl Into<String>,
    addressing_style: AddressingStyle,
) -> Result<App, AppError> {
    let mut config = S3Config::new(endpoint);
    config.region = region.into();
    config.addressing_style = addressing_style;

    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3(config))
        .build()
}

/// Create application from environment variables
pub fn create_app_from_env() -> Result<App, AppError> {
    AppBuilder::new().with_config(AppConfig::from_env()?).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory_app() {
        let app = create_in_memory_app().unwrap();
        assert!(app.state.connector.endpoint().is_none());
        assert_eq!(app.state.settings.api_path, "/api");
        assert_eq!(app.config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_s3_app_reports_endpoint() {
        let app = create_s3_app("http://localhost:9000", "eu-west-1", AddressingStyle::Path)
            .unwrap();
        assert_eq!(
            app.state.connector.endpoint(),
            Some("http://localhost:9000".to_string())
        );
    }

    #[test]
    fn test_invalid_s3_endpoint_fails_to_build() {
        let err = create_s3_app("localhost", "us-east-1", AddressingStyle::Auto)
            .err()
            .unwrap();
        assert!(matches!(err, AppError::StorageInit { .. }));
    }

    #[test]
    fn test_builder_overrides() {
        let app = AppBuilder::new()
            .with_delimiter(Delimiter::new("|").unwrap())
            .with_api_path("/mediator")
            .build()
            .unwrap();
        assert_eq!(app.state.settings.delimiter.as_str(), "|");
        assert_eq!(app.state.settings.api_path, "/mediator");
    }

    #[test]
    fn test_builder_applies_timeout_to_upstream() {
        let config = AppConfig {
            request_timeout: Duration::from_secs(5),
            storage_backend: StorageBackend::S3(S3Config::new("http://localhost:9000")),
            ..Default::default()
        };
        let app = AppBuilder::new().with_config(config).build().unwrap();
        match &app.config.storage_backend {
            StorageBackend::S3(s3) => assert_eq!(s3.request_timeout, Duration::from_secs(5)),
            other => panic!("expected S3 backend, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_setting_reports_name() {
        let err = parse_setting::<u16>("SERVER_PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
