use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{MediatorResult, ValidationError},
        models::{
            AdminBucket, AuthUser, QuotaType, UserInfo, UserKey, UserKeySpec, UserLookup,
            UserQuotaSpec, UserSpec,
        },
        value_objects::{BucketName, Credentials},
    },
    ports::{
        services::AdminService,
        storage::{AdminOps, UpstreamStore},
    },
};

/// Gateway administration with the caller's own credentials
pub struct AdminServiceImpl {
    admin: Arc<dyn AdminOps>,
    store: Arc<dyn UpstreamStore>,
    credentials: Credentials,
}

impl AdminServiceImpl {
    pub fn new(
        admin: Arc<dyn AdminOps>,
        store: Arc<dyn UpstreamStore>,
        credentials: Credentials,
    ) -> Self {
        Self {
            admin,
            store,
            credentials,
        }
    }
}

fn require_uid(uid: &str) -> MediatorResult<()> {
    if uid.is_empty() {
        return Err(ValidationError::MissingField("UserId").into());
    }
    Ok(())
}

#[async_trait]
impl AdminService for AdminServiceImpl {
    async fn authenticate(&self) -> MediatorResult<AuthUser> {
        let own_key = UserLookup::AccessKey(self.credentials.access_key().to_string());
        match self.admin.user_info(&self.credentials, &own_key, false).await {
            Ok(user) => Ok(AuthUser {
                id: user.user_id,
                display_name: user.display_name,
                is_admin: user.admin,
            }),
            Err(err) => {
                debug!(error = %err, "admin-ops lookup refused, using bucket owner");
                let owner = self.store.bucket_owner().await?;
                Ok(AuthUser {
                    id: owner.id,
                    display_name: owner.display_name.unwrap_or_default(),
                    is_admin: false,
                })
            }
        }
    }

    async fn list_users(&self, with_statistics: bool) -> MediatorResult<Vec<UserInfo>> {
        let uids = self.admin.list_user_ids(&self.credentials).await?;
        let lookups = uids.into_iter().map(UserLookup::Uid).collect::<Vec<_>>();
        let users = try_join_all(
            lookups
                .iter()
                .map(|lookup| self.admin.user_info(&self.credentials, lookup, with_statistics)),
        )
        .await?;
        Ok(users)
    }

    async fn list_user_ids(&self) -> MediatorResult<Vec<String>> {
        Ok(self.admin.list_user_ids(&self.credentials).await?)
    }

    async fn get_user(&self, uid: &str, with_statistics: bool) -> MediatorResult<UserInfo> {
        require_uid(uid)?;
        let lookup = UserLookup::Uid(uid.to_string());
        Ok(self
            .admin
            .user_info(&self.credentials, &lookup, with_statistics)
            .await?)
    }

    async fn create_user(&self, mut spec: UserSpec) -> MediatorResult<UserInfo> {
        require_uid(&spec.user_id)?;
        if spec.display_name.as_deref().unwrap_or_default().is_empty() {
            return Err(ValidationError::MissingField("DisplayName").into());
        }
        spec.key_type = Some("s3".to_string());

        let user = self.admin.create_user(&self.credentials, &spec).await?;
        info!(uid = %user.user_id, "created user");
        Ok(user)
    }

    async fn update_user(&self, uid: &str, mut spec: UserSpec) -> MediatorResult<UserInfo> {
        require_uid(uid)?;
        spec.user_id = uid.to_string();
        let user = self.admin.update_user(&self.credentials, &spec).await?;
        info!(uid = %user.user_id, "updated user");
        Ok(user)
    }

    async fn delete_user(&self, uid: &str, purge_data: bool) -> MediatorResult<()> {
        require_uid(uid)?;
        self.admin
            .delete_user(&self.credentials, uid, purge_data)
            .await?;
        info!(uid = %uid, purge_data, "deleted user");
        Ok(())
    }

    async fn list_keys(&self, uid: &str) -> MediatorResult<Vec<UserKey>> {
        Ok(self.get_user(uid, false).await?.keys)
    }

    async fn create_key(&self, uid: &str, spec: UserKeySpec) -> MediatorResult<Vec<UserKey>> {
        require_uid(uid)?;
        let keys = self.admin.create_key(&self.credentials, uid, &spec).await?;
        info!(uid = %uid, "created user key");
        Ok(keys)
    }

    async fn delete_key(&self, uid: &str, access_key: &str) -> MediatorResult<()> {
        require_uid(uid)?;
        self.admin
            .delete_key(&self.credentials, uid, access_key)
            .await?;
        info!(uid = %uid, access_key = %access_key, "deleted user key");
        Ok(())
    }

    async fn set_quota(&self, uid: &str, quota: UserQuotaSpec) -> MediatorResult<()> {
        require_uid(uid)?;
        if quota.quota_type != QuotaType::User {
            return Err(ValidationError::InvalidField {
                field: "type".to_string(),
                value: quota.quota_type.as_str().to_string(),
                expected: "user".to_string(),
            }
            .into());
        }
        self.admin.set_quota(&self.credentials, uid, &quota).await?;
        info!(uid = %uid, "updated user quota");
        Ok(())
    }

    async fn list_buckets(&self, uid: Option<&str>) -> MediatorResult<Vec<AdminBucket>> {
        let uid = uid.filter(|uid| !uid.is_empty());
        Ok(self.admin.list_buckets(&self.credentials, uid).await?)
    }

    async fn bucket_info(&self, bucket: &BucketName) -> MediatorResult<AdminBucket> {
        Ok(self.admin.bucket_info(&self.credentials, bucket).await?)
    }
}
