use crate::domain::{
    errors::MediatorResult,
    models::{AdminBucket, AuthUser, UserInfo, UserKey, UserKeySpec, UserQuotaSpec, UserSpec},
    value_objects::BucketName,
};
use async_trait::async_trait;

/// Port for caller identification and gateway administration
#[async_trait]
pub trait AdminService: Send + Sync + 'static {
    /// Who the caller is, and whether they may administer the gateway
    async fn authenticate(&self) -> MediatorResult<AuthUser>;

    async fn list_users(&self, with_statistics: bool) -> MediatorResult<Vec<UserInfo>>;

    async fn list_user_ids(&self) -> MediatorResult<Vec<String>>;

    async fn get_user(&self, uid: &str, with_statistics: bool) -> MediatorResult<UserInfo>;

    /// Requires a display name; keys are always S3 keys
    async fn create_user(&self, spec: UserSpec) -> MediatorResult<UserInfo>;

    async fn update_user(&self, uid: &str, spec: UserSpec) -> MediatorResult<UserInfo>;

    async fn delete_user(&self, uid: &str, purge_data: bool) -> MediatorResult<()>;

    async fn list_keys(&self, uid: &str) -> MediatorResult<Vec<UserKey>>;

    /// Returns every key of the user after the addition
    async fn create_key(&self, uid: &str, spec: UserKeySpec) -> MediatorResult<Vec<UserKey>>;

    async fn delete_key(&self, uid: &str, access_key: &str) -> MediatorResult<()>;

    /// Only user quotas can be set
    async fn set_quota(&self, uid: &str, quota: UserQuotaSpec) -> MediatorResult<()>;

    async fn list_buckets(&self, uid: Option<&str>) -> MediatorResult<Vec<AdminBucket>>;

    async fn bucket_info(&self, bucket: &BucketName) -> MediatorResult<AdminBucket>;
}
