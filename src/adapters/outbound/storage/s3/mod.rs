//! S3 upstream
//!
//! Data-plane calls go through `aws-sdk-s3`, one client per caller's
//! credentials over a shared base configuration. Admin-ops calls go through
//! [`RgwAdminClient`].

mod admin;
mod convert;
pub mod error;
mod store;

pub use admin::RgwAdminClient;
pub use error::S3ClientError;
pub use store::S3Store;

use aws_sdk_s3::{
    config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Builder, Region},
    Client,
};
use std::{net::IpAddr, str::FromStr, sync::Arc, time::Duration};

use reqwest::Url;

use crate::{
    domain::value_objects::Credentials,
    ports::storage::{AdminOps, UpstreamConnector, UpstreamStore},
};

/// How bucket names are placed in request URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressingStyle {
    /// `https://endpoint/bucket/key`
    Path,
    /// `https://bucket.endpoint/key`
    Virtual,
    /// Path style for IP and localhost endpoints, virtual-hosted otherwise
    #[default]
    Auto,
}

impl FromStr for AddressingStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "path" => Ok(AddressingStyle::Path),
            "virtual" => Ok(AddressingStyle::Virtual),
            "auto" => Ok(AddressingStyle::Auto),
            other => Err(format!(
                "unknown addressing style '{}', expected path, virtual or auto",
                other
            )),
        }
    }
}

/// Configuration for the S3 upstream
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub addressing_style: AddressingStyle,
    pub request_timeout: Duration,
}

impl S3Config {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: "us-east-1".to_string(),
            addressing_style: AddressingStyle::Auto,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Parse and check an `http(s)://host[:port][/path]` endpoint
pub fn parse_endpoint(endpoint: &str) -> Result<Url, S3ClientError> {
    let url =
        Url::parse(endpoint).map_err(|_| S3ClientError::InvalidEndpoint(endpoint.to_string()))?;
    let scheme_ok = matches!(url.scheme(), "http" | "https");
    if !scheme_ok || url.host_str().is_none() || url.query().is_some() {
        return Err(S3ClientError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url)
}

pub(crate) fn is_local_endpoint(endpoint: &Url) -> bool {
    match endpoint.host_str() {
        Some(host) => {
            host == "localhost"
                || host.ends_with(".localhost")
                || host
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .parse::<IpAddr>()
                    .is_ok()
        }
        None => false,
    }
}

/// Opens per-caller S3 sessions over one shared configuration
#[derive(Clone)]
pub struct S3Connector {
    config: aws_sdk_s3::Config,
    endpoint: Url,
    region: String,
    admin: Arc<RgwAdminClient>,
}

impl S3Connector {
    pub fn new(config: &S3Config) -> Result<Self, S3ClientError> {
        let endpoint = parse_endpoint(&config.endpoint)?;
        let force_path_style = match config.addressing_style {
            AddressingStyle::Path => true,
            AddressingStyle::Virtual => false,
            AddressingStyle::Auto => is_local_endpoint(&endpoint),
        };

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(endpoint.as_str().trim_end_matches('/'))
            .force_path_style(force_path_style)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.request_timeout)
                    .build(),
            )
            .retry_config(RetryConfig::standard())
            .build();

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let admin = RgwAdminClient::new(http, endpoint.clone(), config.region.clone());

        Ok(Self {
            config: sdk_config,
            endpoint,
            region: config.region.clone(),
            admin: Arc::new(admin),
        })
    }

    fn client_for(&self, credentials: &Credentials) -> Client {
        let credentials = aws_sdk_s3::config::Credentials::new(
            credentials.access_key(),
            credentials.secret_key(),
            None,
            None,
            "x-upstream-credentials",
        );
        Client::from_conf(
            self.config
                .to_builder()
                .credentials_provider(credentials)
                .build(),
        )
    }
}

impl UpstreamConnector for S3Connector {
    fn connect(&self, credentials: &Credentials) -> Arc<dyn UpstreamStore> {
        Arc::new(S3Store::new(self.client_for(credentials), self.region.clone()))
    }

    fn admin_ops(&self) -> Arc<dyn AdminOps> {
        self.admin.clone()
    }

    fn endpoint(&self) -> Option<String> {
        Some(self.endpoint.as_str().trim_end_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        assert!(parse_endpoint("http://localhost:9000").is_ok());
        assert!(parse_endpoint("https://s3.eu-west-1.amazonaws.com/").is_ok());
        assert!(parse_endpoint("ftp://example.com").is_err());
        assert!(parse_endpoint("localhost:9000").is_err());
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn test_local_endpoints() {
        let local = ["http://localhost:9000", "http://127.0.0.1:9000", "http://[::1]:9000"];
        for endpoint in local {
            assert!(is_local_endpoint(&parse_endpoint(endpoint).unwrap()), "{}", endpoint);
        }
        assert!(!is_local_endpoint(
            &parse_endpoint("https://s3.amazonaws.com").unwrap()
        ));
    }

    #[test]
    fn test_addressing_style_from_str() {
        assert_eq!("PATH".parse::<AddressingStyle>(), Ok(AddressingStyle::Path));
        assert_eq!("virtual".parse::<AddressingStyle>(), Ok(AddressingStyle::Virtual));
        assert_eq!("auto".parse::<AddressingStyle>(), Ok(AddressingStyle::Auto));
        assert!("dns".parse::<AddressingStyle>().is_err());
    }

    #[tokio::test]
    async fn test_sessions_keep_base_region() {
        let mut config = S3Config::new("http://127.0.0.1:9000");
        config.region = "eu-west-1".to_string();
        let connector = S3Connector::new(&config).unwrap();
        let client = connector.client_for(&Credentials::new("alice", "secret").unwrap());
        assert_eq!(
            client.config().region().map(|region| region.as_ref()),
            Some("eu-west-1")
        );
    }

    #[test]
    fn test_connector_reports_endpoint() {
        let connector = S3Connector::new(&S3Config::new("http://localhost:9000/")).unwrap();
        assert_eq!(
            connector.endpoint(),
            Some("http://localhost:9000".to_string())
        );
    }
}
