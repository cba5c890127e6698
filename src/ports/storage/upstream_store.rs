use async_trait::async_trait;
use std::sync::Arc;

use super::AdminOps;
use crate::domain::{
    errors::UpstreamResult,
    models::{
        BucketOwner, BucketSummary, DeleteCandidate, DeleteObjectsOutcome, DeletedObject, LegalHoldStatus,
        LifecycleConfiguration, ListingQuery, ObjectHead, ObjectLockConfiguration, ObjectsPage,
        SubResource, TagSet, VersionsCursor, VersionsPage,
    },
    value_objects::{BucketName, Credentials, ObjectKey, VersionId},
};

/// Port for paginated listings of an upstream bucket
#[async_trait]
pub trait ListingStore: Send + Sync + 'static {
    /// Fetch one page of current objects, resuming after `continuation_token`
    async fn list_objects(
        &self,
        query: &ListingQuery,
        continuation_token: Option<&str>,
    ) -> UpstreamResult<ObjectsPage>;

    /// Fetch one page of versions and delete markers, resuming at `cursor`
    async fn list_object_versions(
        &self,
        query: &ListingQuery,
        cursor: &VersionsCursor,
    ) -> UpstreamResult<VersionsPage>;
}

/// Port for bucket-level upstream operations
#[async_trait]
pub trait BucketStore: Send + Sync + 'static {
    async fn list_buckets(&self) -> UpstreamResult<Vec<BucketSummary>>;

    /// Owner of the caller's buckets, as reported by `ListBuckets`
    async fn bucket_owner(&self) -> UpstreamResult<BucketOwner>;

    async fn head_bucket(&self, bucket: &BucketName) -> UpstreamResult<()>;

    async fn create_bucket(&self, bucket: &BucketName, object_lock: bool) -> UpstreamResult<()>;

    async fn delete_bucket(&self, bucket: &BucketName) -> UpstreamResult<()>;

    /// `true` when versioning is enabled; suspended and never-enabled are `false`
    async fn get_bucket_versioning(&self, bucket: &BucketName) -> UpstreamResult<bool>;

    async fn put_bucket_versioning(&self, bucket: &BucketName, enabled: bool)
        -> UpstreamResult<()>;

    async fn get_object_lock_configuration(
        &self,
        bucket: &BucketName,
    ) -> UpstreamResult<SubResource<ObjectLockConfiguration>>;

    async fn put_object_lock_configuration(
        &self,
        bucket: &BucketName,
        config: &ObjectLockConfiguration,
    ) -> UpstreamResult<()>;

    async fn get_bucket_tagging(&self, bucket: &BucketName) -> UpstreamResult<SubResource<TagSet>>;

    async fn put_bucket_tagging(&self, bucket: &BucketName, tags: &TagSet) -> UpstreamResult<()>;

    async fn get_bucket_lifecycle(
        &self,
        bucket: &BucketName,
    ) -> UpstreamResult<SubResource<LifecycleConfiguration>>;

    async fn put_bucket_lifecycle(
        &self,
        bucket: &BucketName,
        config: &LifecycleConfiguration,
    ) -> UpstreamResult<()>;

    async fn delete_bucket_lifecycle(&self, bucket: &BucketName) -> UpstreamResult<()>;
}

/// Port for object-level upstream operations
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn head_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<ObjectHead>;

    async fn get_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<SubResource<TagSet>>;

    async fn put_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        tags: &TagSet,
    ) -> UpstreamResult<()>;

    async fn get_object_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<SubResource<LegalHoldStatus>>;

    async fn put_object_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        status: LegalHoldStatus,
    ) -> UpstreamResult<()>;

    /// Copy `key` (at `source_version`, or current) onto itself as a new version
    async fn copy_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        source_version: Option<&VersionId>,
    ) -> UpstreamResult<()>;

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<DeletedObject>;

    /// Delete up to 1000 objects in one call; per-item failures are not errors
    async fn delete_objects(
        &self,
        bucket: &BucketName,
        candidates: &[DeleteCandidate],
    ) -> UpstreamResult<DeleteObjectsOutcome>;
}

/// Full upstream capability, as handed to the services
pub trait UpstreamStore: ListingStore + BucketStore + ObjectStore {}

impl<T> UpstreamStore for T where T: ListingStore + BucketStore + ObjectStore {}

/// Opens an upstream session for one caller's credentials
pub trait UpstreamConnector: Send + Sync + 'static {
    fn connect(&self, credentials: &Credentials) -> Arc<dyn UpstreamStore>;

    /// Admin-ops API of the same gateway
    fn admin_ops(&self) -> Arc<dyn AdminOps>;

    /// Endpoint shown to clients, if the backend has one
    fn endpoint(&self) -> Option<String> {
        None
    }
}
