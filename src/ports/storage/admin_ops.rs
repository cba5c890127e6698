use async_trait::async_trait;

use crate::domain::{
    errors::UpstreamResult,
    models::{AdminBucket, UserInfo, UserKey, UserKeySpec, UserLookup, UserQuotaSpec, UserSpec},
    value_objects::{BucketName, Credentials},
};

/// Port for the gateway's admin-ops API.
///
/// Every call is signed with the credentials it is given; the gateway decides
/// whether they carry admin capabilities.
#[async_trait]
pub trait AdminOps: Send + Sync + 'static {
    async fn user_info(
        &self,
        credentials: &Credentials,
        lookup: &UserLookup,
        stats: bool,
    ) -> UpstreamResult<UserInfo>;

    async fn list_user_ids(&self, credentials: &Credentials) -> UpstreamResult<Vec<String>>;

    async fn create_user(&self, credentials: &Credentials, spec: &UserSpec)
        -> UpstreamResult<UserInfo>;

    async fn update_user(&self, credentials: &Credentials, spec: &UserSpec)
        -> UpstreamResult<UserInfo>;

    async fn delete_user(
        &self,
        credentials: &Credentials,
        uid: &str,
        purge_data: bool,
    ) -> UpstreamResult<()>;

    /// Returns every key of the user after the addition
    async fn create_key(
        &self,
        credentials: &Credentials,
        uid: &str,
        spec: &UserKeySpec,
    ) -> UpstreamResult<Vec<UserKey>>;

    async fn delete_key(
        &self,
        credentials: &Credentials,
        uid: &str,
        access_key: &str,
    ) -> UpstreamResult<()>;

    async fn set_quota(
        &self,
        credentials: &Credentials,
        uid: &str,
        spec: &UserQuotaSpec,
    ) -> UpstreamResult<()>;

    /// Buckets with usage statistics, optionally only those owned by `uid`
    async fn list_buckets(
        &self,
        credentials: &Credentials,
        uid: Option<&str>,
    ) -> UpstreamResult<Vec<AdminBucket>>;

    async fn bucket_info(
        &self,
        credentials: &Credentials,
        bucket: &BucketName,
    ) -> UpstreamResult<AdminBucket>;
}
