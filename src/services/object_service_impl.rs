use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::{
    domain::{
        errors::MediatorResult,
        models::{
            DeleteCandidate, DeletedObject, Entry, LegalHoldStatus, ListingQuery,
            ObjectAttributes, ObjectAttributesUpdate, PrefixDeletionPlan, TagSet,
        },
        value_objects::{BucketName, Delimiter, ObjectKey, VersionId},
    },
    ports::{services::ObjectService, storage::UpstreamStore},
    services::{
        aggregator::AttributeAggregator, hierarchy::HierarchyBuilder,
        pagination::PaginationWalker, prefix_deleter::PrefixDeleter, reconciler::Reconciler,
    },
};

/// Object browsing and management against one upstream session
pub struct ObjectServiceImpl {
    store: Arc<dyn UpstreamStore>,
    walker: PaginationWalker<dyn UpstreamStore>,
    aggregator: AttributeAggregator<dyn UpstreamStore>,
    reconciler: Reconciler<dyn UpstreamStore>,
    deleter: PrefixDeleter<dyn UpstreamStore>,
    delimiter: Delimiter,
}

impl ObjectServiceImpl {
    pub fn new(store: Arc<dyn UpstreamStore>) -> Self {
        Self::with_delimiter(store, Delimiter::default())
    }

    /// `delimiter` is used to name objects in attribute lookups
    pub fn with_delimiter(store: Arc<dyn UpstreamStore>, delimiter: Delimiter) -> Self {
        Self {
            walker: PaginationWalker::new(store.clone()),
            aggregator: AttributeAggregator::new(store.clone()),
            reconciler: Reconciler::new(store.clone()),
            deleter: PrefixDeleter::new(store.clone()),
            store,
            delimiter,
        }
    }

    fn query(bucket: &BucketName, prefix: Option<&str>, delimiter: &Delimiter) -> ListingQuery {
        ListingQuery::builder()
            .bucket(bucket.as_str())
            .maybe_prefix(prefix.filter(|p| !p.is_empty()))
            .delimiter(delimiter.as_str())
            .build()
    }
}

#[async_trait]
impl ObjectService for ObjectServiceImpl {
    async fn list_entries(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        delimiter: &Delimiter,
    ) -> MediatorResult<Vec<Entry>> {
        let records = self
            .walker
            .walk_objects(&Self::query(bucket, prefix, delimiter))
            .await?;
        Ok(HierarchyBuilder::new(delimiter.clone()).build(&records))
    }

    async fn list_version_entries(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        delimiter: &Delimiter,
    ) -> MediatorResult<Vec<Entry>> {
        let records = self
            .walker
            .walk_versions(&Self::query(bucket, prefix, delimiter))
            .await?;
        Ok(HierarchyBuilder::new(delimiter.clone()).build(&records))
    }

    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> MediatorResult<bool> {
        match self.store.head_object(bucket, key, None).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_attributes(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> MediatorResult<ObjectAttributes> {
        self.aggregator
            .object_attributes(bucket, key, version_id, &self.delimiter)
            .await
    }

    async fn update_attributes(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        requested: ObjectAttributesUpdate,
    ) -> MediatorResult<ObjectAttributes> {
        self.reconciler
            .update_object(bucket, key, version_id, requested, &self.delimiter)
            .await
    }

    async fn set_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        tags: TagSet,
    ) -> MediatorResult<bool> {
        self.reconciler
            .set_object_tagging(bucket, key, version_id, &tags)
            .await
    }

    async fn set_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        status: LegalHoldStatus,
    ) -> MediatorResult<bool> {
        self.reconciler
            .set_legal_hold(bucket, key, version_id, status)
            .await
    }

    async fn restore(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> MediatorResult<()> {
        self.store.copy_object(bucket, key, version_id).await?;
        info!(
            bucket = %bucket,
            key = %key,
            version_id = ?version_id.map(VersionId::as_str),
            "restored object version"
        );
        Ok(())
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> MediatorResult<DeletedObject> {
        let deleted = self.store.delete_object(bucket, key, version_id).await?;
        info!(
            bucket = %bucket,
            key = %key,
            delete_marker = deleted.delete_marker,
            "deleted object"
        );
        Ok(deleted)
    }

    async fn plan_delete_by_prefix(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &Delimiter,
        all_versions: bool,
    ) -> MediatorResult<PrefixDeletionPlan> {
        self.deleter
            .plan(bucket, prefix, delimiter, all_versions)
            .await
    }

    async fn delete_by_prefix(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &Delimiter,
        all_versions: bool,
    ) -> MediatorResult<Vec<DeleteCandidate>> {
        self.deleter
            .delete_by_prefix(bucket, prefix, delimiter, all_versions)
            .await
    }
}
