use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    domain::{
        errors::{MediatorError, MediatorResult, SubResourceKind, UpstreamError},
        models::{AggregateAttributes, ObjectAttributes, ObjectLockSettings},
        value_objects::{BucketName, Delimiter, ObjectKey, VersionId},
    },
    ports::storage::{BucketStore, ObjectStore},
};

/// Reads independent upstream sub-resources concurrently and folds them
/// into one aggregate record.
///
/// The read fails as a whole if any sub-read fails; the first failure
/// observed is reported together with the sub-resource it belongs to.
pub struct AttributeAggregator<S: BucketStore + ObjectStore + ?Sized> {
    store: Arc<S>,
}

impl<S: BucketStore + ObjectStore + ?Sized> AttributeAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn bucket_attributes(
        &self,
        bucket: &BucketName,
    ) -> MediatorResult<AggregateAttributes> {
        let identity = async {
            let buckets = self.store.list_buckets().await?;
            buckets
                .into_iter()
                .find(|summary| summary.name == bucket.as_str())
                .ok_or_else(|| UpstreamError::not_found(bucket.as_str(), "NoSuchBucket"))
        };
        let versioning = self.store.get_bucket_versioning(bucket);
        let object_lock = self.store.get_object_lock_configuration(bucket);
        let tagging = self.store.get_bucket_tagging(bucket);

        let (identity, versioning_enabled, object_lock, tag_set) = tokio::try_join!(
            labelled(bucket.as_str(), SubResourceKind::Identity, identity),
            labelled(bucket.as_str(), SubResourceKind::Versioning, versioning),
            labelled(bucket.as_str(), SubResourceKind::ObjectLock, object_lock),
            labelled(bucket.as_str(), SubResourceKind::Tagging, tagging),
        )?;

        debug!(bucket = %bucket, "aggregated bucket attributes");

        Ok(AggregateAttributes {
            name: identity.name,
            creation_date: identity.creation_date,
            versioning_enabled: Some(versioning_enabled),
            tag_set: tag_set.unwrap_or_default(),
            object_lock: ObjectLockSettings::from_lookup(object_lock),
        })
    }

    pub async fn object_attributes(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        delimiter: &Delimiter,
    ) -> MediatorResult<ObjectAttributes> {
        let resource = format!("{}/{}", bucket, key);

        let (head, tagging, legal_hold) = tokio::try_join!(
            labelled(
                &resource,
                SubResourceKind::ObjectHead,
                self.store.head_object(bucket, key, version_id),
            ),
            labelled(
                &resource,
                SubResourceKind::ObjectTagging,
                self.store.get_object_tagging(bucket, key, version_id),
            ),
            labelled(
                &resource,
                SubResourceKind::LegalHold,
                self.store.get_object_legal_hold(bucket, key, version_id),
            ),
        )?;

        debug!(bucket = %bucket, key = %key, "aggregated object attributes");

        Ok(ObjectAttributes {
            name: delimiter
                .last_segment(&head.key)
                .unwrap_or_else(|| head.key.clone()),
            key: head.key,
            version_id: head.version_id,
            size: head.size,
            etag: head.etag,
            last_modified: head.last_modified,
            content_type: head.content_type,
            tag_set: tagging.unwrap_or_default(),
            legal_hold: legal_hold.configured().or(head.legal_hold),
            retention_mode: head.retention_mode,
            retain_until: head.retain_until,
        })
    }
}

/// Attach the sub-resource name to a failing read and log it
async fn labelled<T, F>(resource: &str, sub_resource: SubResourceKind, read: F) -> MediatorResult<T>
where
    F: std::future::Future<Output = Result<T, UpstreamError>>,
{
    read.await.map_err(|source| {
        error!(
            resource = %resource,
            sub_resource = %sub_resource,
            error = %source,
            "unable to obtain {} of '{}'",
            sub_resource,
            resource
        );
        MediatorError::AggregateRead {
            resource: resource.to_string(),
            sub_resource,
            source,
        }
    })
}
