use anyhow::{Context, Result};
use clap::Parser;
use object_store_mediator::{
    adapters::outbound::storage::s3::{AddressingStyle, S3Config},
    app::{AppBuilder, AppConfig, StorageBackend},
    domain::value_objects::Delimiter,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "object-store-mediator")]
#[command(about = "Mediates a browser UI and an S3-compatible object store", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Storage backend type (memory or s3)
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// S3 endpoint URL
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// Bucket addressing: path, virtual or auto
    #[arg(long, env = "S3_ADDRESSING_STYLE", default_value = "auto")]
    s3_addressing_style: AddressingStyle,

    /// Delimiter used to derive folders from keys
    #[arg(long, env = "S3_PREFIX_DELIMITER", default_value = "/")]
    delimiter: String,

    /// Path the API is served under
    #[arg(long, env = "API_PATH", default_value = "/api")]
    api_path: String,

    /// Identifier reported by the config endpoint
    #[arg(long, env = "INSTANCE_ID", default_value = "")]
    instance_id: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let storage_backend = match self.storage_backend.as_str() {
            "memory" => StorageBackend::InMemory,
            "s3" => {
                let endpoint = self
                    .s3_endpoint
                    .clone()
                    .context("S3_ENDPOINT is required for S3 backend")?;
                let mut config = S3Config::new(endpoint);
                config.region = self.s3_region.clone();
                config.addressing_style = self.s3_addressing_style;
                StorageBackend::S3(config)
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        };

        let delimiter = Delimiter::new(self.delimiter.clone())
            .context("S3_PREFIX_DELIMITER must not be empty")?;

        Ok(AppConfig {
            host: self.host.clone(),
            port: self.port,
            storage_backend,
            delimiter,
            api_path: self.api_path.clone(),
            instance_id: self.instance_id.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }

    fn init_logging(&self) -> Result<()> {
        let env_filter = match std::env::var("RUST_LOG") {
            Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives),
            _ => EnvFilter::try_new(self.log_level.to_lowercase()),
        }
        .context("Invalid log filter")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting object store mediator");
    info!("Storage backend: {}", cli.storage_backend);

    let config = cli.to_app_config()?;
    let addr = config.socket_addr()?;

    let app = AppBuilder::new()
        .with_config(config)
        .build()
        .context("Failed to build application")?;
    let router = app.router();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(api_path = %app.config.api_path, "Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "object-store-mediator",
            "--port",
            "9090",
            "--storage-backend",
            "s3",
            "--s3-endpoint",
            "http://localhost:9000",
            "--s3-addressing-style",
            "path",
        ]);

        assert_eq!(cli.port, 9090);
        assert_eq!(cli.storage_backend, "s3");
        assert_eq!(cli.s3_addressing_style, AddressingStyle::Path);

        let config = cli.to_app_config().unwrap();
        match config.storage_backend {
            StorageBackend::S3(s3) => {
                assert_eq!(s3.endpoint, "http://localhost:9000");
                assert_eq!(s3.region, "us-east-1");
            }
            other => panic!("Expected S3 backend, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_config() {
        let cli = Cli::parse_from(["object-store-mediator"]);

        let config = cli.to_app_config().unwrap();
        assert!(matches!(config.storage_backend, StorageBackend::InMemory));
        assert_eq!(config.delimiter.as_str(), "/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_s3_requires_endpoint() {
        let cli = Cli::parse_from(["object-store-mediator", "--storage-backend", "s3"]);
        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let cli = Cli::parse_from(["object-store-mediator", "--storage-backend", "gcs"]);
        assert!(cli.to_app_config().is_err());
    }
}
