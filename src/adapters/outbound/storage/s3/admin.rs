//! Admin-ops API of an RGW-compatible gateway
//!
//! Plain JSON over HTTP under `<endpoint>/admin/`, signed with SigV4 by
//! `aws-sigv4` using the credentials passed to each call.

use async_trait::async_trait;
use aws_credential_types::Credentials as AwsCredentials;
use aws_sigv4::{
    http_request::{
        sign, PayloadChecksumKind, SignableBody, SignableRequest, SigningParams, SigningSettings,
    },
    sign::v4,
};
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use std::time::SystemTime;
use tracing::debug;

use super::error::{status_code, S3ClientError};
use crate::{
    domain::{
        errors::UpstreamResult,
        models::{
            AdminBucket, UserInfo, UserKey, UserKeySpec, UserLookup, UserQuotaSpec, UserSpec,
        },
        value_objects::{BucketName, Credentials},
    },
    ports::storage::AdminOps,
};

/// Error document of the admin-ops API
#[derive(Debug, serde::Deserialize)]
struct AdminErrorBody {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// Shared admin-ops client; holds no credentials of its own
#[derive(Clone, Debug)]
pub struct RgwAdminClient {
    http: Client,
    endpoint: Url,
    region: String,
}

struct AdminRequest<'a> {
    method: Method,
    path: &'a str,
    params: Vec<(&'static str, String)>,
    resource: &'a str,
}

impl<'a> AdminRequest<'a> {
    fn new(method: Method, path: &'a str, resource: &'a str) -> Self {
        Self {
            method,
            path,
            params: Vec::new(),
            resource,
        }
    }

    /// Sub-resource flag such as `?key`
    fn flag(mut self, name: &'static str) -> Self {
        self.params.push((name, String::new()));
        self
    }

    fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    fn params(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.params.extend(params);
        self
    }
}

impl RgwAdminClient {
    pub fn new(http: Client, endpoint: Url, region: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            region: region.into(),
        }
    }

    fn url(&self, request: &AdminRequest<'_>) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(&format!(
            "{}/admin/{}",
            self.endpoint.path().trim_end_matches('/'),
            request.path
        ));
        url.set_query(None);
        if !request.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.params.iter().map(|(name, value)| (*name, value.as_str())));
        }
        url
    }

    async fn send(
        &self,
        credentials: &Credentials,
        request: AdminRequest<'_>,
    ) -> Result<Response, S3ClientError> {
        let url = self.url(&request);

        let identity: Identity = AwsCredentials::new(
            credentials.access_key(),
            credentials.secret_key(),
            None,
            None,
            "x-upstream-credentials",
        )
        .into();
        let mut settings = SigningSettings::default();
        settings.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;
        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name("s3")
            .time(SystemTime::now())
            .settings(settings)
            .build()
            .map_err(|e| S3ClientError::Signing(e.to_string()))?
            .into();
        let signable = SignableRequest::new(
            request.method.as_str(),
            url.as_str(),
            std::iter::empty(),
            SignableBody::Bytes(&[]),
        )
        .map_err(|e| S3ClientError::Signing(e.to_string()))?;
        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| S3ClientError::Signing(e.to_string()))?
            .into_parts();

        debug!(method = %request.method, url = %url, "Sending admin-ops request");

        let mut builder = self.http.request(request.method.clone(), url);
        for (name, value) in instructions.headers() {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<AdminErrorBody>(&body) {
            Ok(error) if !error.code.is_empty() => (error.code, error.message),
            _ => (status_code(status.as_u16()), body),
        };
        Err(S3ClientError::Status {
            status: status.as_u16(),
            code,
            message,
            resource: request.resource.to_string(),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        request: AdminRequest<'_>,
    ) -> UpstreamResult<T> {
        let response = self.send(credentials, request).await?;
        Ok(response.json().await.map_err(S3ClientError::from)?)
    }

    async fn execute(
        &self,
        credentials: &Credentials,
        request: AdminRequest<'_>,
    ) -> UpstreamResult<()> {
        self.send(credentials, request).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminOps for RgwAdminClient {
    async fn user_info(
        &self,
        credentials: &Credentials,
        lookup: &UserLookup,
        stats: bool,
    ) -> UpstreamResult<UserInfo> {
        let (name, value) = lookup.query_param();
        let request = AdminRequest::new(Method::GET, "user", value)
            .param(name, value)
            .param("stats", stats);
        self.send_json(credentials, request).await
    }

    async fn list_user_ids(&self, credentials: &Credentials) -> UpstreamResult<Vec<String>> {
        let request = AdminRequest::new(Method::GET, "metadata/user", "users");
        self.send_json(credentials, request).await
    }

    async fn create_user(
        &self,
        credentials: &Credentials,
        spec: &UserSpec,
    ) -> UpstreamResult<UserInfo> {
        let request =
            AdminRequest::new(Method::PUT, "user", &spec.user_id).params(spec.query_params());
        self.send_json(credentials, request).await
    }

    async fn update_user(
        &self,
        credentials: &Credentials,
        spec: &UserSpec,
    ) -> UpstreamResult<UserInfo> {
        let request =
            AdminRequest::new(Method::POST, "user", &spec.user_id).params(spec.query_params());
        self.send_json(credentials, request).await
    }

    async fn delete_user(
        &self,
        credentials: &Credentials,
        uid: &str,
        purge_data: bool,
    ) -> UpstreamResult<()> {
        let request = AdminRequest::new(Method::DELETE, "user", uid)
            .param("uid", uid)
            .param("purge-data", purge_data);
        self.execute(credentials, request).await
    }

    async fn create_key(
        &self,
        credentials: &Credentials,
        uid: &str,
        spec: &UserKeySpec,
    ) -> UpstreamResult<Vec<UserKey>> {
        let request = AdminRequest::new(Method::PUT, "user", uid)
            .flag("key")
            .params(spec.query_params(uid));
        self.send_json(credentials, request).await
    }

    async fn delete_key(
        &self,
        credentials: &Credentials,
        uid: &str,
        access_key: &str,
    ) -> UpstreamResult<()> {
        let request = AdminRequest::new(Method::DELETE, "user", uid)
            .flag("key")
            .param("uid", uid)
            .param("access-key", access_key);
        self.execute(credentials, request).await
    }

    async fn set_quota(
        &self,
        credentials: &Credentials,
        uid: &str,
        spec: &UserQuotaSpec,
    ) -> UpstreamResult<()> {
        let request = AdminRequest::new(Method::PUT, "user", uid)
            .flag("quota")
            .params(spec.query_params(uid));
        self.execute(credentials, request).await
    }

    async fn list_buckets(
        &self,
        credentials: &Credentials,
        uid: Option<&str>,
    ) -> UpstreamResult<Vec<AdminBucket>> {
        // Without stats the gateway only returns bucket names
        let mut request = AdminRequest::new(Method::GET, "bucket", "buckets").param("stats", true);
        if let Some(uid) = uid {
            request = request.param("uid", uid);
        }
        self.send_json(credentials, request).await
    }

    async fn bucket_info(
        &self,
        credentials: &Credentials,
        bucket: &BucketName,
    ) -> UpstreamResult<AdminBucket> {
        let request = AdminRequest::new(Method::GET, "bucket", bucket.as_str())
            .param("bucket", bucket.as_str())
            .param("stats", true);
        self.send_json(credentials, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> RgwAdminClient {
        RgwAdminClient::new(Client::new(), Url::parse(endpoint).unwrap(), "us-east-1")
    }

    #[test]
    fn test_admin_urls() {
        let client = client("http://127.0.0.1:7480");
        let request = AdminRequest::new(Method::PUT, "user", "bob")
            .flag("key")
            .param("uid", "bob")
            .param("access-key", "A/K");
        assert_eq!(
            client.url(&request).as_str(),
            "http://127.0.0.1:7480/admin/user?key=&uid=bob&access-key=A%2FK"
        );
    }

    #[test]
    fn test_admin_urls_keep_endpoint_path() {
        let client = client("https://gateway.example.com/rgw/");
        let request = AdminRequest::new(Method::GET, "metadata/user", "users");
        assert_eq!(
            client.url(&request).as_str(),
            "https://gateway.example.com/rgw/admin/metadata/user"
        );
    }
}
