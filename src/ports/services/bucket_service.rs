use crate::domain::{
    errors::MediatorResult,
    models::{
        AggregateAttributes, BucketSummary, LifecycleConfiguration, ObjectLockSettings, TagSet,
    },
    value_objects::BucketName,
};
use async_trait::async_trait;

/// Port for bucket management on behalf of one caller
#[async_trait]
pub trait BucketService: Send + Sync + 'static {
    async fn list_buckets(&self) -> MediatorResult<Vec<BucketSummary>>;

    async fn create_bucket(&self, bucket: &BucketName, object_lock: bool) -> MediatorResult<()>;

    async fn delete_bucket(&self, bucket: &BucketName) -> MediatorResult<()>;

    async fn bucket_exists(&self, bucket: &BucketName) -> MediatorResult<bool>;

    /// Aggregate versioning, object lock and tags into one record
    async fn get_attributes(&self, bucket: &BucketName) -> MediatorResult<AggregateAttributes>;

    /// Reconcile the bucket towards `requested`, reporting what actually took effect
    async fn update_attributes(
        &self,
        bucket: &BucketName,
        requested: AggregateAttributes,
    ) -> MediatorResult<AggregateAttributes>;

    async fn get_versioning(&self, bucket: &BucketName) -> MediatorResult<bool>;

    /// Returns whether the upstream accepted the change
    async fn set_versioning(&self, bucket: &BucketName, enabled: bool) -> MediatorResult<bool>;

    async fn get_object_lock(&self, bucket: &BucketName) -> MediatorResult<ObjectLockSettings>;

    /// Returns the settings now in effect, or disabled settings if refused
    async fn set_object_lock(
        &self,
        bucket: &BucketName,
        settings: ObjectLockSettings,
    ) -> MediatorResult<ObjectLockSettings>;

    async fn get_tagging(&self, bucket: &BucketName) -> MediatorResult<TagSet>;

    async fn set_tagging(&self, bucket: &BucketName, tags: TagSet) -> MediatorResult<bool>;

    async fn get_lifecycle(&self, bucket: &BucketName) -> MediatorResult<LifecycleConfiguration>;

    /// Empty rule lists remove the configuration
    async fn set_lifecycle(
        &self,
        bucket: &BucketName,
        config: LifecycleConfiguration,
    ) -> MediatorResult<bool>;
}
