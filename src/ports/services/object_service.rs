use crate::domain::{
    errors::MediatorResult,
    models::{
        DeleteCandidate, DeletedObject, Entry, LegalHoldStatus, ObjectAttributes,
        ObjectAttributesUpdate, PrefixDeletionPlan, TagSet,
    },
    value_objects::{BucketName, Delimiter, ObjectKey, VersionId},
};
use async_trait::async_trait;

/// Port for object browsing and management on behalf of one caller
#[async_trait]
pub trait ObjectService: Send + Sync + 'static {
    /// Current objects and folders directly below `prefix`
    async fn list_entries(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        delimiter: &Delimiter,
    ) -> MediatorResult<Vec<Entry>>;

    /// All versions, delete markers and folders directly below `prefix`
    async fn list_version_entries(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        delimiter: &Delimiter,
    ) -> MediatorResult<Vec<Entry>>;

    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> MediatorResult<bool>;

    async fn get_attributes(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> MediatorResult<ObjectAttributes>;

    /// Reconcile tags and legal hold, reporting what actually took effect
    async fn update_attributes(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        requested: ObjectAttributesUpdate,
    ) -> MediatorResult<ObjectAttributes>;

    async fn set_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        tags: TagSet,
    ) -> MediatorResult<bool>;

    async fn set_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        status: LegalHoldStatus,
    ) -> MediatorResult<bool>;

    /// Make `version_id` the current version again by copying it over the key
    async fn restore(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> MediatorResult<()>;

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> MediatorResult<DeletedObject>;

    /// Compute what [`ObjectService::delete_by_prefix`] would remove
    async fn plan_delete_by_prefix(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &Delimiter,
        all_versions: bool,
    ) -> MediatorResult<PrefixDeletionPlan>;

    /// Recursively delete everything below `prefix`
    async fn delete_by_prefix(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &Delimiter,
        all_versions: bool,
    ) -> MediatorResult<Vec<DeleteCandidate>>;
}
