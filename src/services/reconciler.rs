use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    domain::{
        errors::{MediatorError, MediatorResult, UpstreamError},
        models::{
            AggregateAttributes, LegalHoldStatus, LifecycleConfiguration, ObjectAttributes,
            ObjectAttributesUpdate, ObjectLockSettings, TagSet,
        },
        value_objects::{BucketName, Delimiter, ObjectKey, VersionId},
    },
    ports::storage::{BucketStore, ObjectStore},
    services::aggregator::AttributeAggregator,
};

/// Applies the difference between a requested and the current aggregate
/// record, issuing only the sub-writes that are needed.
///
/// The returned record never claims a change the upstream refused: a failed
/// versioning write reports the opposite of the request, a failed tag write
/// reports the current tags, and a refused object-lock write reports object
/// lock as disabled.
pub struct Reconciler<S: BucketStore + ObjectStore + ?Sized> {
    store: Arc<S>,
    aggregator: AttributeAggregator<S>,
}

impl<S: BucketStore + ObjectStore + ?Sized> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            aggregator: AttributeAggregator::new(store.clone()),
            store,
        }
    }

    /// Reconcile a bucket towards `requested`.
    ///
    /// Object lock is only written when the request enables it with a
    /// complete retention rule that differs from the current one. When no
    /// lock write happens the reported lock settings are the current ones,
    /// whatever the request carried.
    pub async fn update_bucket(
        &self,
        bucket: &BucketName,
        requested: AggregateAttributes,
    ) -> MediatorResult<AggregateAttributes> {
        requested.object_lock.validate()?;

        // All writes are decided against this snapshot
        let current = self.aggregator.bucket_attributes(bucket).await?;

        let versioning_change = requested
            .versioning_enabled
            .filter(|enabled| Some(*enabled) != current.versioning_enabled);
        let tagging_change = requested.tag_set != current.tag_set;
        let lock_change = requested.object_lock.has_complete_retention()
            && requested.object_lock.object_lock_enabled == Some(true)
            && requested.object_lock.retention_differs(&current.object_lock);

        let versioning_write = async {
            match versioning_change {
                Some(enabled) => self.set_versioning(bucket, enabled).await.map(Some),
                None => Ok(None),
            }
        };
        let tagging_write = async {
            if tagging_change {
                self.set_tagging(bucket, &requested.tag_set).await.map(Some)
            } else {
                Ok(None)
            }
        };
        let lock_write = async {
            if lock_change {
                self.set_object_lock(bucket, &requested.object_lock)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };

        let (versioning_applied, tagging_applied, lock_result) =
            tokio::try_join!(versioning_write, tagging_write, lock_write)?;

        let versioning_enabled = match requested.versioning_enabled {
            Some(enabled) if versioning_applied == Some(false) => Some(!enabled),
            Some(enabled) => Some(enabled),
            None => current.versioning_enabled,
        };
        let tag_set = if tagging_applied == Some(false) {
            current.tag_set
        } else {
            requested.tag_set
        };
        let object_lock = lock_result.unwrap_or(current.object_lock);

        Ok(AggregateAttributes {
            name: bucket.as_str().to_string(),
            creation_date: current.creation_date.or(requested.creation_date),
            versioning_enabled,
            tag_set,
            object_lock,
        })
    }

    pub async fn update_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        requested: ObjectAttributesUpdate,
        delimiter: &Delimiter,
    ) -> MediatorResult<ObjectAttributes> {
        let current = self
            .aggregator
            .object_attributes(bucket, key, version_id, delimiter)
            .await?;

        let tagging_change = requested
            .tag_set
            .as_ref()
            .filter(|tags| **tags != current.tag_set);
        let current_hold = current.legal_hold.unwrap_or(LegalHoldStatus::Off);
        let legal_hold_change = requested.legal_hold.filter(|status| *status != current_hold);

        let tagging_write = async {
            match tagging_change {
                Some(tags) => self
                    .set_object_tagging(bucket, key, version_id, tags)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let legal_hold_write = async {
            match legal_hold_change {
                Some(status) => self
                    .set_legal_hold(bucket, key, version_id, status)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };

        let (tagging_applied, legal_hold_applied) =
            tokio::try_join!(tagging_write, legal_hold_write)?;

        let mut result = current;
        if let (Some(true), Some(tags)) = (tagging_applied, requested.tag_set) {
            result.tag_set = tags;
        }
        if let (Some(true), Some(status)) = (legal_hold_applied, requested.legal_hold) {
            result.legal_hold = Some(status);
        }
        Ok(result)
    }

    /// `Ok(false)` when the upstream refused the change
    pub async fn set_versioning(&self, bucket: &BucketName, enabled: bool) -> MediatorResult<bool> {
        let outcome = self.store.put_bucket_versioning(bucket, enabled).await;
        applied(outcome, bucket.as_str(), "versioning")
    }

    pub async fn set_tagging(&self, bucket: &BucketName, tags: &TagSet) -> MediatorResult<bool> {
        let outcome = self.store.put_bucket_tagging(bucket, tags).await;
        applied(outcome, bucket.as_str(), "tagging")
    }

    /// Returns the settings now in effect, or disabled settings if refused
    pub async fn set_object_lock(
        &self,
        bucket: &BucketName,
        settings: &ObjectLockSettings,
    ) -> MediatorResult<ObjectLockSettings> {
        let config = settings.to_configuration()?;
        let outcome = self
            .store
            .put_object_lock_configuration(bucket, &config)
            .await;

        if applied(outcome, bucket.as_str(), "object lock configuration")? {
            Ok(ObjectLockSettings {
                object_lock_enabled: Some(true),
                retention_enabled: Some(config.default_retention.is_some()),
                ..settings.clone()
            })
        } else {
            Ok(ObjectLockSettings::disabled())
        }
    }

    /// An empty rule list removes the lifecycle configuration
    pub async fn set_lifecycle(
        &self,
        bucket: &BucketName,
        config: &LifecycleConfiguration,
    ) -> MediatorResult<bool> {
        config.validate()?;
        let outcome = if config.is_empty() {
            self.store.delete_bucket_lifecycle(bucket).await
        } else {
            self.store.put_bucket_lifecycle(bucket, config).await
        };
        applied(outcome, bucket.as_str(), "lifecycle configuration")
    }

    pub async fn set_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        tags: &TagSet,
    ) -> MediatorResult<bool> {
        let outcome = self
            .store
            .put_object_tagging(bucket, key, version_id, tags)
            .await;
        applied(outcome, &format!("{}/{}", bucket, key), "object tagging")
    }

    pub async fn set_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        status: LegalHoldStatus,
    ) -> MediatorResult<bool> {
        let outcome = self
            .store
            .put_object_legal_hold(bucket, key, version_id, status)
            .await;
        applied(outcome, &format!("{}/{}", bucket, key), "legal hold")
    }
}

/// Rejections become `false`; transient failures propagate
fn applied(
    outcome: Result<(), UpstreamError>,
    resource: &str,
    sub_resource: &str,
) -> MediatorResult<bool> {
    match outcome {
        Ok(()) => {
            info!(resource = %resource, "updated {}", sub_resource);
            Ok(true)
        }
        Err(err) if err.is_rejection() => {
            warn!(
                resource = %resource,
                error = %err,
                "upstream refused {} update",
                sub_resource
            );
            Ok(false)
        }
        Err(err) => Err(MediatorError::Upstream(err)),
    }
}
