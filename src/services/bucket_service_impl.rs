use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::{
    domain::{
        errors::MediatorResult,
        models::{
            AggregateAttributes, BucketSummary, LifecycleConfiguration, ObjectLockSettings, TagSet,
        },
        value_objects::BucketName,
    },
    ports::{services::BucketService, storage::UpstreamStore},
    services::{aggregator::AttributeAggregator, reconciler::Reconciler},
};

/// Bucket management against one upstream session
pub struct BucketServiceImpl {
    store: Arc<dyn UpstreamStore>,
    aggregator: AttributeAggregator<dyn UpstreamStore>,
    reconciler: Reconciler<dyn UpstreamStore>,
}

impl BucketServiceImpl {
    pub fn new(store: Arc<dyn UpstreamStore>) -> Self {
        Self {
            aggregator: AttributeAggregator::new(store.clone()),
            reconciler: Reconciler::new(store.clone()),
            store,
        }
    }
}

#[async_trait]
impl BucketService for BucketServiceImpl {
    async fn list_buckets(&self) -> MediatorResult<Vec<BucketSummary>> {
        Ok(self.store.list_buckets().await?)
    }

    async fn create_bucket(&self, bucket: &BucketName, object_lock: bool) -> MediatorResult<()> {
        self.store.create_bucket(bucket, object_lock).await?;
        info!(bucket = %bucket, object_lock, "created bucket");
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> MediatorResult<()> {
        self.store.delete_bucket(bucket).await?;
        info!(bucket = %bucket, "deleted bucket");
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &BucketName) -> MediatorResult<bool> {
        match self.store.head_bucket(bucket).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_attributes(&self, bucket: &BucketName) -> MediatorResult<AggregateAttributes> {
        self.aggregator.bucket_attributes(bucket).await
    }

    async fn update_attributes(
        &self,
        bucket: &BucketName,
        requested: AggregateAttributes,
    ) -> MediatorResult<AggregateAttributes> {
        self.reconciler.update_bucket(bucket, requested).await
    }

    async fn get_versioning(&self, bucket: &BucketName) -> MediatorResult<bool> {
        Ok(self.store.get_bucket_versioning(bucket).await?)
    }

    async fn set_versioning(&self, bucket: &BucketName, enabled: bool) -> MediatorResult<bool> {
        self.reconciler.set_versioning(bucket, enabled).await
    }

    async fn get_object_lock(&self, bucket: &BucketName) -> MediatorResult<ObjectLockSettings> {
        let lookup = self.store.get_object_lock_configuration(bucket).await?;
        Ok(ObjectLockSettings::from_lookup(lookup))
    }

    async fn set_object_lock(
        &self,
        bucket: &BucketName,
        settings: ObjectLockSettings,
    ) -> MediatorResult<ObjectLockSettings> {
        self.reconciler.set_object_lock(bucket, &settings).await
    }

    async fn get_tagging(&self, bucket: &BucketName) -> MediatorResult<TagSet> {
        Ok(self.store.get_bucket_tagging(bucket).await?.unwrap_or_default())
    }

    async fn set_tagging(&self, bucket: &BucketName, tags: TagSet) -> MediatorResult<bool> {
        self.reconciler.set_tagging(bucket, &tags).await
    }

    async fn get_lifecycle(&self, bucket: &BucketName) -> MediatorResult<LifecycleConfiguration> {
        Ok(self
            .store
            .get_bucket_lifecycle(bucket)
            .await?
            .unwrap_or_default())
    }

    async fn set_lifecycle(
        &self,
        bucket: &BucketName,
        config: LifecycleConfiguration,
    ) -> MediatorResult<bool> {
        self.reconciler.set_lifecycle(bucket, &config).await
    }
}
