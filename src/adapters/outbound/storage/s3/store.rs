use async_trait::async_trait;
use aws_sdk_s3::{types as sdk, Client};
use tracing::debug;

use super::{
    convert,
    error::{build_error, from_sdk, sub_resource},
};
use crate::{
    domain::{
        errors::{UpstreamError, UpstreamResult},
        models::{
            BucketOwner, BucketSummary, DeleteCandidate, DeleteObjectsOutcome, DeletedObject,
            LegalHoldStatus, LifecycleConfiguration, ListingQuery, ObjectHead,
            ObjectLockConfiguration, ObjectsPage, SubResource, TagSet, VersionsCursor,
            VersionsPage,
        },
        value_objects::{BucketName, ObjectKey, VersionId},
    },
    ports::storage::{BucketStore, ListingStore, ObjectStore},
};

/// Region S3 expects no location constraint for
const DEFAULT_REGION: &str = "us-east-1";

/// S3 upstream bound to one caller's credentials
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    region: String,
}

impl S3Store {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

fn object_resource(bucket: &BucketName, key: &ObjectKey) -> String {
    format!("{}/{}", bucket, key.as_str())
}

fn version_of(version_id: Option<&VersionId>) -> Option<String> {
    version_id.map(|version| version.as_str().to_string())
}

#[async_trait]
impl ListingStore for S3Store {
    async fn list_objects(
        &self,
        query: &ListingQuery,
        continuation_token: Option<&str>,
    ) -> UpstreamResult<ObjectsPage> {
        debug!(bucket = %query.bucket, prefix = ?query.prefix, "ListObjectsV2");
        let output = self
            .client
            .list_objects_v2()
            .bucket(&query.bucket)
            .set_prefix(query.prefix.clone())
            .set_delimiter(query.delimiter.clone())
            .set_max_keys(query.max_keys.and_then(|max| i32::try_from(max).ok()))
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| from_sdk(e, &query.bucket))?;
        Ok(convert::objects_page(&output))
    }

    async fn list_object_versions(
        &self,
        query: &ListingQuery,
        cursor: &VersionsCursor,
    ) -> UpstreamResult<VersionsPage> {
        debug!(bucket = %query.bucket, prefix = ?query.prefix, "ListObjectVersions");
        let output = self
            .client
            .list_object_versions()
            .bucket(&query.bucket)
            .set_prefix(query.prefix.clone())
            .set_delimiter(query.delimiter.clone())
            .set_max_keys(query.max_keys.and_then(|max| i32::try_from(max).ok()))
            .set_key_marker(cursor.key_marker.clone())
            .set_version_id_marker(cursor.version_id_marker.clone())
            .send()
            .await
            .map_err(|e| from_sdk(e, &query.bucket))?;
        Ok(convert::versions_page(&output))
    }
}

#[async_trait]
impl BucketStore for S3Store {
    async fn list_buckets(&self) -> UpstreamResult<Vec<BucketSummary>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| from_sdk(e, "/"))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                Some(BucketSummary {
                    name: bucket.name()?.to_string(),
                    creation_date: bucket.creation_date().and_then(convert::to_utc),
                })
            })
            .collect())
    }

    async fn bucket_owner(&self) -> UpstreamResult<BucketOwner> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| from_sdk(e, "/"))?;
        let owner = output
            .owner()
            .ok_or_else(|| UpstreamError::unknown("MissingOwner", "ListBuckets returned no owner"))?;
        Ok(BucketOwner {
            id: owner.id().unwrap_or_default().to_string(),
            display_name: owner.display_name().map(str::to_string),
        })
    }

    async fn head_bucket(&self, bucket: &BucketName) -> UpstreamResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &BucketName, object_lock: bool) -> UpstreamResult<()> {
        let location = (self.region != DEFAULT_REGION).then(|| {
            sdk::CreateBucketConfiguration::builder()
                .location_constraint(sdk::BucketLocationConstraint::from(self.region.as_str()))
                .build()
        });
        self.client
            .create_bucket()
            .bucket(bucket.as_str())
            .object_lock_enabled_for_bucket(object_lock)
            .set_create_bucket_configuration(location)
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> UpstreamResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &BucketName) -> UpstreamResult<bool> {
        let output = self
            .client
            .get_bucket_versioning()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(output.status() == Some(&sdk::BucketVersioningStatus::Enabled))
    }

    async fn put_bucket_versioning(
        &self,
        bucket: &BucketName,
        enabled: bool,
    ) -> UpstreamResult<()> {
        let status = if enabled {
            sdk::BucketVersioningStatus::Enabled
        } else {
            sdk::BucketVersioningStatus::Suspended
        };
        self.client
            .put_bucket_versioning()
            .bucket(bucket.as_str())
            .versioning_configuration(
                sdk::VersioningConfiguration::builder()
                    .status(status)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn get_object_lock_configuration(
        &self,
        bucket: &BucketName,
    ) -> UpstreamResult<SubResource<ObjectLockConfiguration>> {
        let result = self
            .client
            .get_object_lock_configuration()
            .bucket(bucket.as_str())
            .send()
            .await;
        Ok(sub_resource(result, &[], bucket.as_str())?.map(|output| {
            output
                .object_lock_configuration()
                .map(convert::object_lock)
                .unwrap_or(ObjectLockConfiguration {
                    enabled: false,
                    default_retention: None,
                })
        }))
    }

    async fn put_object_lock_configuration(
        &self,
        bucket: &BucketName,
        config: &ObjectLockConfiguration,
    ) -> UpstreamResult<()> {
        self.client
            .put_object_lock_configuration()
            .bucket(bucket.as_str())
            .object_lock_configuration(convert::object_lock_document(config))
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn get_bucket_tagging(&self, bucket: &BucketName) -> UpstreamResult<SubResource<TagSet>> {
        let result = self
            .client
            .get_bucket_tagging()
            .bucket(bucket.as_str())
            .send()
            .await;
        Ok(sub_resource(result, &[], bucket.as_str())?
            .map(|output| convert::tag_set(output.tag_set())))
    }

    async fn put_bucket_tagging(&self, bucket: &BucketName, tags: &TagSet) -> UpstreamResult<()> {
        if tags.is_empty() {
            self.client
                .delete_bucket_tagging()
                .bucket(bucket.as_str())
                .send()
                .await
                .map_err(|e| from_sdk(e, bucket.as_str()))?;
            return Ok(());
        }
        self.client
            .put_bucket_tagging()
            .bucket(bucket.as_str())
            .tagging(convert::tagging_document(tags).map_err(build_error)?)
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn get_bucket_lifecycle(
        &self,
        bucket: &BucketName,
    ) -> UpstreamResult<SubResource<LifecycleConfiguration>> {
        let result = self
            .client
            .get_bucket_lifecycle_configuration()
            .bucket(bucket.as_str())
            .send()
            .await;
        Ok(sub_resource(result, &[], bucket.as_str())?
            .map(|output| convert::lifecycle(output.rules())))
    }

    async fn put_bucket_lifecycle(
        &self,
        bucket: &BucketName,
        config: &LifecycleConfiguration,
    ) -> UpstreamResult<()> {
        self.client
            .put_bucket_lifecycle_configuration()
            .bucket(bucket.as_str())
            .lifecycle_configuration(convert::lifecycle_document(config).map_err(build_error)?)
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }

    async fn delete_bucket_lifecycle(&self, bucket: &BucketName) -> UpstreamResult<()> {
        self.client
            .delete_bucket_lifecycle()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<ObjectHead> {
        let output = self
            .client
            .head_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_of(version_id))
            .send()
            .await
            .map_err(|e| from_sdk(e, &object_resource(bucket, key)))?;
        Ok(convert::object_head(key.as_str(), &output))
    }

    async fn get_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<SubResource<TagSet>> {
        let result = self
            .client
            .get_object_tagging()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_of(version_id))
            .send()
            .await;
        Ok(sub_resource(result, &[], &object_resource(bucket, key))?
            .map(|output| convert::tag_set(output.tag_set())))
    }

    async fn put_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        tags: &TagSet,
    ) -> UpstreamResult<()> {
        let resource = object_resource(bucket, key);
        if tags.is_empty() {
            self.client
                .delete_object_tagging()
                .bucket(bucket.as_str())
                .key(key.as_str())
                .set_version_id(version_of(version_id))
                .send()
                .await
                .map_err(|e| from_sdk(e, &resource))?;
            return Ok(());
        }
        self.client
            .put_object_tagging()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_of(version_id))
            .tagging(convert::tagging_document(tags).map_err(build_error)?)
            .send()
            .await
            .map_err(|e| from_sdk(e, &resource))?;
        Ok(())
    }

    async fn get_object_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<SubResource<LegalHoldStatus>> {
        let result = self
            .client
            .get_object_legal_hold()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_of(version_id))
            .send()
            .await;
        // Buckets without object lock answer InvalidRequest here
        let lookup = sub_resource(result, &["InvalidRequest"], &object_resource(bucket, key))?;
        Ok(
            match lookup.map(|output| output.legal_hold().and_then(convert::legal_hold)) {
                SubResource::Configured(Some(status)) => SubResource::Configured(status),
                _ => SubResource::NotConfigured,
            },
        )
    }

    async fn put_object_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        status: LegalHoldStatus,
    ) -> UpstreamResult<()> {
        self.client
            .put_object_legal_hold()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_of(version_id))
            .legal_hold(convert::legal_hold_document(status))
            .send()
            .await
            .map_err(|e| from_sdk(e, &object_resource(bucket, key)))?;
        Ok(())
    }

    async fn copy_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        source_version: Option<&VersionId>,
    ) -> UpstreamResult<()> {
        let source = convert::copy_source(
            bucket.as_str(),
            key.as_str(),
            source_version.map(VersionId::as_str),
        );
        self.client
            .copy_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .copy_source(source)
            .metadata_directive(sdk::MetadataDirective::Copy)
            .send()
            .await
            .map_err(|e| from_sdk(e, &object_resource(bucket, key)))?;
        Ok(())
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<DeletedObject> {
        let output = self
            .client
            .delete_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .set_version_id(version_of(version_id))
            .send()
            .await
            .map_err(|e| from_sdk(e, &object_resource(bucket, key)))?;

        let delete_marker = output.delete_marker().unwrap_or(false);
        Ok(DeletedObject {
            key: key.as_str().to_string(),
            version_id: version_of(version_id),
            delete_marker,
            delete_marker_version_id: if delete_marker {
                output.version_id().map(str::to_string)
            } else {
                None
            },
        })
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        candidates: &[DeleteCandidate],
    ) -> UpstreamResult<DeleteObjectsOutcome> {
        if candidates.is_empty() {
            return Ok(DeleteObjectsOutcome::default());
        }
        let output = self
            .client
            .delete_objects()
            .bucket(bucket.as_str())
            .delete(convert::delete_document(candidates).map_err(build_error)?)
            .send()
            .await
            .map_err(|e| from_sdk(e, bucket.as_str()))?;
        Ok(convert::delete_outcome(&output))
    }
}
