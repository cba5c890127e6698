use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    listing,
    state::{BucketState, StoredBody, StoredVersion, VersioningState, NULL_VERSION},
};
use crate::{
    domain::{
        errors::{UpstreamError, UpstreamResult},
        models::{
            AdminBucket, BucketOwner, BucketSummary, BucketUsage, DeleteCandidate, DeleteFailure,
            DeleteObjectsOutcome, DeletedObject, LegalHoldStatus, LifecycleConfiguration,
            ListingQuery, ObjectHead, ObjectLockConfiguration, ObjectsPage, QuotaInfo, QuotaType,
            SubResource, TagSet, UserInfo, UserKey, UserKeySpec, UserLookup, UserQuotaSpec,
            UserSpec, UserStatistics, VersionsCursor, VersionsPage,
        },
        value_objects::{BucketName, Credentials, ObjectKey, VersionId},
    },
    ports::storage::{AdminOps, BucketStore, ListingStore, ObjectStore},
};

/// Default page size, matching the S3 listing limit
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Owner of every bucket until [`InMemoryStore::set_owner`] is called
pub const DEFAULT_OWNER: &str = "local";

/// Upstream calls, as counted and faulted by [`InMemoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ListObjects,
    ListObjectVersions,
    ListBuckets,
    HeadBucket,
    CreateBucket,
    DeleteBucket,
    GetBucketVersioning,
    PutBucketVersioning,
    GetObjectLockConfiguration,
    PutObjectLockConfiguration,
    GetBucketTagging,
    PutBucketTagging,
    GetBucketLifecycle,
    PutBucketLifecycle,
    DeleteBucketLifecycle,
    HeadObject,
    GetObjectTagging,
    PutObjectTagging,
    GetObjectLegalHold,
    PutObjectLegalHold,
    CopyObject,
    DeleteObject,
    DeleteObjects,
    AdminUserInfo,
    AdminListUsers,
    AdminCreateUser,
    AdminUpdateUser,
    AdminDeleteUser,
    AdminCreateKey,
    AdminDeleteKey,
    AdminSetQuota,
    AdminListBuckets,
    AdminBucketInfo,
}

struct StoreState {
    buckets: BTreeMap<String, BucketState>,
    faults: HashMap<StoreOperation, UpstreamError>,
    calls: HashMap<StoreOperation, usize>,
    protected_keys: HashSet<String>,
    users: BTreeMap<String, UserInfo>,
    owner: BucketOwner,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
            faults: HashMap::new(),
            calls: HashMap::new(),
            protected_keys: HashSet::new(),
            users: BTreeMap::new(),
            owner: BucketOwner {
                id: DEFAULT_OWNER.to_string(),
                display_name: Some(DEFAULT_OWNER.to_string()),
            },
        }
    }
}

/// In-process S3-compatible upstream used for local development and tests.
///
/// Models versioning with delete markers, object lock that can only be
/// configured on buckets created with it, bucket and object tags, legal
/// holds, lifecycle documents and delimiter listings with a configurable
/// page size. Every call can be counted and made to fail.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    page_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Listings return at most `page_size` items per page
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            page_size: page_size.max(1),
        }
    }

    /// Make every following call of `operation` fail with `error`
    pub async fn fail(&self, operation: StoreOperation, error: UpstreamError) {
        self.state.write().await.faults.insert(operation, error);
    }

    pub async fn clear_faults(&self) {
        self.state.write().await.faults.clear();
    }

    /// Number of times `operation` was called, faulted calls included
    pub async fn calls(&self, operation: StoreOperation) -> usize {
        self.state
            .read()
            .await
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Owner reported for every bucket
    pub async fn set_owner(&self, id: impl Into<String>, display_name: Option<&str>) {
        self.state.write().await.owner = BucketOwner {
            id: id.into(),
            display_name: display_name.map(str::to_string),
        };
    }

    /// Register a user; admin users may call the admin-ops API with their keys
    pub async fn add_user(&self, info: UserInfo) {
        self.state
            .write()
            .await
            .users
            .insert(info.user_id.clone(), info);
    }

    /// Refuse to delete any version of `key`, as an access policy would
    pub async fn deny_deletion(&self, key: impl Into<String>) {
        self.state.write().await.protected_keys.insert(key.into());
    }

    /// Store a new object version and return its version id
    pub async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> UpstreamResult<String> {
        let data = data.into();
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;

        let now = Utc::now();
        let version_id = bucket_state.next_version_id();
        let version = StoredVersion {
            version_id: version_id.clone(),
            body: Some(StoredBody {
                etag: format!("\"{:x}\"", md5::compute(&data)),
                data,
                content_type: content_type.map(str::to_string),
            }),
            last_modified: now,
            tags: TagSet::empty(),
            legal_hold: None,
            retention: bucket_state.default_retention(now),
        };
        bucket_state.push_version(key.as_str(), version);

        debug!(bucket = %bucket, key = %key, version_id = %version_id, "stored object");
        Ok(version_id)
    }

    /// Count the call and return the injected fault, if any
    async fn enter(&self, operation: StoreOperation) -> UpstreamResult<()> {
        let mut state = self.state.write().await;
        *state.calls.entry(operation).or_insert(0) += 1;
        match state.faults.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Delete `key` (or one of its versions) following S3 versioning rules
    fn delete_in(
        bucket_state: &mut BucketState,
        protected_keys: &HashSet<String>,
        key: &str,
        version_id: Option<&str>,
    ) -> UpstreamResult<DeletedObject> {
        if protected_keys.contains(key) {
            return Err(access_denied(key));
        }

        if let Some(version_id) = version_id {
            let now = Utc::now();
            let version = bucket_state
                .find(key, Some(version_id))
                .ok_or_else(|| UpstreamError::not_found(key, "NoSuchVersion"))?;
            if version.is_protected(now) {
                return Err(access_denied(key));
            }
            let removed = bucket_state
                .remove_version(key, version_id)
                .ok_or_else(|| UpstreamError::not_found(key, "NoSuchVersion"))?;
            return Ok(DeletedObject {
                key: key.to_string(),
                version_id: Some(removed.version_id),
                delete_marker: removed.body.is_none(),
                delete_marker_version_id: None,
            });
        }

        match bucket_state.versioning {
            VersioningState::Unversioned => {
                bucket_state.objects.remove(key);
                Ok(DeletedObject {
                    key: key.to_string(),
                    version_id: None,
                    delete_marker: false,
                    delete_marker_version_id: None,
                })
            }
            VersioningState::Enabled | VersioningState::Suspended => {
                let marker_id = bucket_state.next_version_id();
                bucket_state.push_version(
                    key,
                    StoredVersion {
                        version_id: marker_id.clone(),
                        body: None,
                        last_modified: Utc::now(),
                        tags: TagSet::empty(),
                        legal_hold: None,
                        retention: None,
                    },
                );
                Ok(DeletedObject {
                    key: key.to_string(),
                    version_id: None,
                    delete_marker: true,
                    delete_marker_version_id: Some(marker_id),
                })
            }
        }
    }
}

fn bucket_ref<'a>(
    buckets: &'a BTreeMap<String, BucketState>,
    bucket: &BucketName,
) -> UpstreamResult<&'a BucketState> {
    buckets
        .get(bucket.as_str())
        .ok_or_else(|| UpstreamError::not_found(bucket.as_str(), "NoSuchBucket"))
}

fn bucket_mut<'a>(
    buckets: &'a mut BTreeMap<String, BucketState>,
    bucket: &BucketName,
) -> UpstreamResult<&'a mut BucketState> {
    buckets
        .get_mut(bucket.as_str())
        .ok_or_else(|| UpstreamError::not_found(bucket.as_str(), "NoSuchBucket"))
}

/// The version a read targets; delete markers read as missing keys
fn live_version<'a>(
    bucket_state: &'a BucketState,
    key: &ObjectKey,
    version_id: Option<&VersionId>,
) -> UpstreamResult<&'a StoredVersion> {
    let version = match version_id {
        Some(id) => bucket_state
            .find(key.as_str(), Some(id.as_str()))
            .ok_or_else(|| UpstreamError::not_found(key.as_str(), "NoSuchVersion"))?,
        None => bucket_state
            .latest(key.as_str())
            .ok_or_else(|| UpstreamError::not_found(key.as_str(), "NoSuchKey"))?,
    };

    if version.is_delete_marker() {
        return match version_id {
            Some(_) => Err(UpstreamError::Unknown {
                code: "MethodNotAllowed".to_string(),
                message: "The specified method is not allowed against a delete marker"
                    .to_string(),
                status: Some(405),
            }),
            None => Err(UpstreamError::not_found(key.as_str(), "NoSuchKey")),
        };
    }
    Ok(version)
}

fn access_denied(key: &str) -> UpstreamError {
    UpstreamError::Unknown {
        code: "AccessDenied".to_string(),
        message: format!("deletion of '{}' is not permitted", key),
        status: Some(403),
    }
}

fn missing_object_lock(bucket: &BucketName) -> UpstreamError {
    UpstreamError::Unknown {
        code: "InvalidRequest".to_string(),
        message: format!("bucket '{}' is missing object lock configuration", bucket),
        status: Some(400),
    }
}

fn rejected(code: &str, message: &str) -> UpstreamError {
    UpstreamError::Unknown {
        code: code.to_string(),
        message: message.to_string(),
        status: Some(403),
    }
}

fn no_such_user(uid: &str) -> UpstreamError {
    UpstreamError::not_found(uid, "NoSuchUser")
}

/// Admin-ops calls need the full key pair of an admin user
fn authorize(users: &BTreeMap<String, UserInfo>, credentials: &Credentials) -> UpstreamResult<()> {
    let holder = users.values().find_map(|user| {
        user.keys
            .iter()
            .find(|key| key.access_key == credentials.access_key())
            .map(|key| (user, key))
    });
    match holder {
        None => Err(rejected(
            "InvalidAccessKeyId",
            "The access key you provided does not exist",
        )),
        Some((_, key)) if key.secret_key != credentials.secret_key() => Err(rejected(
            "SignatureDoesNotMatch",
            "The request signature does not match",
        )),
        Some((user, _)) if !user.admin => Err(rejected("AccessDenied", "Admin capabilities required")),
        Some(_) => Ok(()),
    }
}

fn generated_key(uid: &str) -> UserKey {
    let access_key = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    let secret_key = format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    );
    UserKey {
        user: uid.to_string(),
        access_key: access_key[..20].to_string(),
        secret_key: secret_key[..40].to_string(),
    }
}

fn key_in_use(users: &BTreeMap<String, UserInfo>, access_key: &str) -> bool {
    users
        .values()
        .any(|user| user.keys.iter().any(|key| key.access_key == access_key))
}

/// Key requested by a spec: the given pair, or a generated one
fn requested_key(
    uid: &str,
    access_key: Option<&str>,
    secret_key: Option<&str>,
    generate: Option<bool>,
) -> Option<UserKey> {
    match (generate, access_key, secret_key) {
        (Some(true), _, _) => Some(generated_key(uid)),
        (_, Some(access_key), Some(secret_key)) => Some(UserKey {
            user: uid.to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        }),
        (Some(false), _, _) => None,
        _ => Some(generated_key(uid)),
    }
}

/// Size and count of the current, non-deleted objects
fn usage(bucket_state: &BucketState) -> BucketUsage {
    bucket_state
        .objects
        .values()
        .filter_map(|versions| versions.last())
        .filter(|version| !version.is_delete_marker())
        .fold(BucketUsage::default(), |usage, version| BucketUsage {
            size_actual: usage.size_actual + version.size(),
            num_objects: usage.num_objects + 1,
        })
}

fn admin_bucket(name: &str, bucket_state: &BucketState, owner: &str) -> AdminBucket {
    let timestamp = bucket_state.created.to_rfc3339();
    AdminBucket {
        bucket: name.to_string(),
        id: name.to_string(),
        owner: owner.to_string(),
        tenant: String::new(),
        zonegroup: String::new(),
        placement_rule: "default-placement".to_string(),
        num_shards: Some(1),
        mtime: timestamp.clone(),
        creation_time: timestamp,
        usage: BTreeMap::from([("rgw.main".to_string(), usage(bucket_state))]),
        bucket_quota: None,
    }
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn list_objects(
        &self,
        query: &ListingQuery,
        continuation_token: Option<&str>,
    ) -> UpstreamResult<ObjectsPage> {
        self.enter(StoreOperation::ListObjects).await?;
        let state = self.state.read().await;
        let bucket_state = state
            .buckets
            .get(&query.bucket)
            .ok_or_else(|| UpstreamError::not_found(query.bucket.as_str(), "NoSuchBucket"))?;
        Ok(listing::objects_page(
            &bucket_state.objects,
            query,
            continuation_token,
            self.page_size,
        ))
    }

    async fn list_object_versions(
        &self,
        query: &ListingQuery,
        cursor: &VersionsCursor,
    ) -> UpstreamResult<VersionsPage> {
        self.enter(StoreOperation::ListObjectVersions).await?;
        let state = self.state.read().await;
        let bucket_state = state
            .buckets
            .get(&query.bucket)
            .ok_or_else(|| UpstreamError::not_found(query.bucket.as_str(), "NoSuchBucket"))?;
        Ok(listing::versions_page(
            &bucket_state.objects,
            query,
            cursor,
            self.page_size,
        ))
    }
}

#[async_trait]
impl BucketStore for InMemoryStore {
    async fn list_buckets(&self) -> UpstreamResult<Vec<BucketSummary>> {
        self.enter(StoreOperation::ListBuckets).await?;
        let state = self.state.read().await;
        Ok(state
            .buckets
            .iter()
            .map(|(name, bucket)| BucketSummary {
                name: name.clone(),
                creation_date: Some(bucket.created),
            })
            .collect())
    }

    async fn bucket_owner(&self) -> UpstreamResult<BucketOwner> {
        self.enter(StoreOperation::ListBuckets).await?;
        Ok(self.state.read().await.owner.clone())
    }

    async fn head_bucket(&self, bucket: &BucketName) -> UpstreamResult<()> {
        self.enter(StoreOperation::HeadBucket).await?;
        let state = self.state.read().await;
        bucket_ref(&state.buckets, bucket).map(|_| ())
    }

    async fn create_bucket(&self, bucket: &BucketName, object_lock: bool) -> UpstreamResult<()> {
        self.enter(StoreOperation::CreateBucket).await?;
        let mut state = self.state.write().await;
        if state.buckets.contains_key(bucket.as_str()) {
            return Err(UpstreamError::AlreadyExists {
                resource: bucket.as_str().to_string(),
            });
        }
        state
            .buckets
            .insert(bucket.as_str().to_string(), BucketState::new(object_lock));
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> UpstreamResult<()> {
        self.enter(StoreOperation::DeleteBucket).await?;
        let mut state = self.state.write().await;
        if !bucket_ref(&state.buckets, bucket)?.objects.is_empty() {
            return Err(UpstreamError::conflict(
                bucket.as_str(),
                "BucketNotEmpty",
                "The bucket you tried to delete is not empty",
            ));
        }
        state.buckets.remove(bucket.as_str());
        Ok(())
    }

    async fn get_bucket_versioning(&self, bucket: &BucketName) -> UpstreamResult<bool> {
        self.enter(StoreOperation::GetBucketVersioning).await?;
        let state = self.state.read().await;
        Ok(bucket_ref(&state.buckets, bucket)?.versioning == VersioningState::Enabled)
    }

    async fn put_bucket_versioning(
        &self,
        bucket: &BucketName,
        enabled: bool,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::PutBucketVersioning).await?;
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;

        if !enabled && bucket_state.object_lock.is_some() {
            return Err(UpstreamError::conflict(
                bucket.as_str(),
                "InvalidBucketState",
                "An Object Lock configuration is present on this bucket, so the versioning state cannot be changed",
            ));
        }
        bucket_state.versioning = match (enabled, bucket_state.versioning) {
            (true, _) => VersioningState::Enabled,
            (false, VersioningState::Unversioned) => VersioningState::Unversioned,
            (false, _) => VersioningState::Suspended,
        };
        Ok(())
    }

    async fn get_object_lock_configuration(
        &self,
        bucket: &BucketName,
    ) -> UpstreamResult<SubResource<ObjectLockConfiguration>> {
        self.enter(StoreOperation::GetObjectLockConfiguration).await?;
        let state = self.state.read().await;
        Ok(match &bucket_ref(&state.buckets, bucket)?.object_lock {
            Some(config) => SubResource::Configured(config.clone()),
            None => SubResource::NotConfigured,
        })
    }

    async fn put_object_lock_configuration(
        &self,
        bucket: &BucketName,
        config: &ObjectLockConfiguration,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::PutObjectLockConfiguration).await?;
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;

        if !bucket_state.object_lock_allowed {
            return Err(UpstreamError::conflict(
                bucket.as_str(),
                "InvalidBucketState",
                "Object Lock configuration cannot be enabled on existing buckets",
            ));
        }
        bucket_state.object_lock = Some(config.clone());
        Ok(())
    }

    async fn get_bucket_tagging(&self, bucket: &BucketName) -> UpstreamResult<SubResource<TagSet>> {
        self.enter(StoreOperation::GetBucketTagging).await?;
        let state = self.state.read().await;
        Ok(match &bucket_ref(&state.buckets, bucket)?.tags {
            Some(tags) => SubResource::Configured(tags.clone()),
            None => SubResource::NotConfigured,
        })
    }

    async fn put_bucket_tagging(&self, bucket: &BucketName, tags: &TagSet) -> UpstreamResult<()> {
        self.enter(StoreOperation::PutBucketTagging).await?;
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;
        bucket_state.tags = (!tags.is_empty()).then(|| tags.clone());
        Ok(())
    }

    async fn get_bucket_lifecycle(
        &self,
        bucket: &BucketName,
    ) -> UpstreamResult<SubResource<LifecycleConfiguration>> {
        self.enter(StoreOperation::GetBucketLifecycle).await?;
        let state = self.state.read().await;
        Ok(match &bucket_ref(&state.buckets, bucket)?.lifecycle {
            Some(config) => SubResource::Configured(config.clone()),
            None => SubResource::NotConfigured,
        })
    }

    async fn put_bucket_lifecycle(
        &self,
        bucket: &BucketName,
        config: &LifecycleConfiguration,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::PutBucketLifecycle).await?;
        let mut state = self.state.write().await;
        bucket_mut(&mut state.buckets, bucket)?.lifecycle = Some(config.clone());
        Ok(())
    }

    async fn delete_bucket_lifecycle(&self, bucket: &BucketName) -> UpstreamResult<()> {
        self.enter(StoreOperation::DeleteBucketLifecycle).await?;
        let mut state = self.state.write().await;
        bucket_mut(&mut state.buckets, bucket)?.lifecycle = None;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn head_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<ObjectHead> {
        self.enter(StoreOperation::HeadObject).await?;
        let state = self.state.read().await;
        let version = live_version(bucket_ref(&state.buckets, bucket)?, key, version_id)?;

        Ok(ObjectHead {
            key: key.as_str().to_string(),
            version_id: (version.version_id != NULL_VERSION).then(|| version.version_id.clone()),
            size: version.size(),
            etag: version.body.as_ref().map(|body| body.etag.clone()),
            last_modified: Some(version.last_modified),
            content_type: version
                .body
                .as_ref()
                .and_then(|body| body.content_type.clone()),
            retention_mode: version.retention.map(|(mode, _)| mode),
            retain_until: version.retention.map(|(_, until)| until),
            legal_hold: version.legal_hold,
        })
    }

    async fn get_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<SubResource<TagSet>> {
        self.enter(StoreOperation::GetObjectTagging).await?;
        let state = self.state.read().await;
        let version = live_version(bucket_ref(&state.buckets, bucket)?, key, version_id)?;
        Ok(SubResource::Configured(version.tags.clone()))
    }

    async fn put_object_tagging(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        tags: &TagSet,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::PutObjectTagging).await?;
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;
        live_version(bucket_state, key, version_id)?;

        if let Some(version) =
            bucket_state.find_mut(key.as_str(), version_id.map(VersionId::as_str))
        {
            version.tags = tags.clone();
        }
        Ok(())
    }

    async fn get_object_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<SubResource<LegalHoldStatus>> {
        self.enter(StoreOperation::GetObjectLegalHold).await?;
        let state = self.state.read().await;
        let bucket_state = bucket_ref(&state.buckets, bucket)?;
        let version = live_version(bucket_state, key, version_id)?;

        Ok(match (&bucket_state.object_lock, version.legal_hold) {
            (Some(_), Some(status)) => SubResource::Configured(status),
            _ => SubResource::NotConfigured,
        })
    }

    async fn put_object_legal_hold(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
        status: LegalHoldStatus,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::PutObjectLegalHold).await?;
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;
        if bucket_state.object_lock.is_none() {
            return Err(missing_object_lock(bucket));
        }
        live_version(bucket_state, key, version_id)?;

        if let Some(version) =
            bucket_state.find_mut(key.as_str(), version_id.map(VersionId::as_str))
        {
            version.legal_hold = Some(status);
        }
        Ok(())
    }

    async fn copy_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        source_version: Option<&VersionId>,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::CopyObject).await?;
        let mut state = self.state.write().await;
        let bucket_state = bucket_mut(&mut state.buckets, bucket)?;
        let source = live_version(bucket_state, key, source_version)?.clone();

        let now = Utc::now();
        let copy = StoredVersion {
            version_id: bucket_state.next_version_id(),
            body: source.body,
            last_modified: now,
            tags: source.tags,
            legal_hold: None,
            retention: bucket_state.default_retention(now),
        };
        bucket_state.push_version(key.as_str(), copy);
        Ok(())
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        version_id: Option<&VersionId>,
    ) -> UpstreamResult<DeletedObject> {
        self.enter(StoreOperation::DeleteObject).await?;
        let mut state = self.state.write().await;
        let StoreState {
            buckets,
            protected_keys,
            ..
        } = &mut *state;
        let bucket_state = bucket_mut(buckets, bucket)?;
        Self::delete_in(
            bucket_state,
            protected_keys,
            key.as_str(),
            version_id.map(VersionId::as_str),
        )
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        candidates: &[DeleteCandidate],
    ) -> UpstreamResult<DeleteObjectsOutcome> {
        self.enter(StoreOperation::DeleteObjects).await?;
        let mut state = self.state.write().await;
        let StoreState {
            buckets,
            protected_keys,
            ..
        } = &mut *state;
        let bucket_state = bucket_mut(buckets, bucket)?;

        let mut outcome = DeleteObjectsOutcome::default();
        for candidate in candidates {
            match Self::delete_in(
                bucket_state,
                protected_keys,
                &candidate.key,
                candidate.version_id.as_deref(),
            ) {
                Ok(deleted) => outcome.deleted.push(deleted),
                Err(err) => outcome.errors.push(DeleteFailure {
                    key: candidate.key.clone(),
                    version_id: candidate.version_id.clone(),
                    code: err.code().unwrap_or("InternalError").to_string(),
                    message: err.to_string(),
                }),
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl AdminOps for InMemoryStore {
    async fn user_info(
        &self,
        credentials: &Credentials,
        lookup: &UserLookup,
        stats: bool,
    ) -> UpstreamResult<UserInfo> {
        self.enter(StoreOperation::AdminUserInfo).await?;
        let state = self.state.read().await;
        authorize(&state.users, credentials)?;

        let user = match lookup {
            UserLookup::Uid(uid) => state.users.get(uid),
            UserLookup::AccessKey(access_key) => state
                .users
                .values()
                .find(|user| user.keys.iter().any(|key| &key.access_key == access_key)),
        };
        let mut info = match user {
            Some(user) => user.clone(),
            None => return Err(no_such_user(lookup.query_param().1)),
        };

        if stats {
            let owned = info.user_id == state.owner.id;
            let totals = state
                .buckets
                .values()
                .filter(|_| owned)
                .map(usage)
                .fold(UserStatistics::default(), |stats, usage| UserStatistics {
                    size: stats.size + usage.size_actual,
                    size_actual: stats.size_actual + usage.size_actual,
                    size_utilized: stats.size_utilized + usage.size_actual,
                    num_objects: stats.num_objects + usage.num_objects,
                    ..stats
                });
            info.stats = Some(UserStatistics {
                size_kb: totals.size.div_ceil(1024),
                size_kb_actual: totals.size_actual.div_ceil(1024),
                size_kb_utilized: totals.size_utilized.div_ceil(1024),
                ..totals
            });
        }
        Ok(info)
    }

    async fn list_user_ids(&self, credentials: &Credentials) -> UpstreamResult<Vec<String>> {
        self.enter(StoreOperation::AdminListUsers).await?;
        let state = self.state.read().await;
        authorize(&state.users, credentials)?;
        Ok(state.users.keys().cloned().collect())
    }

    async fn create_user(
        &self,
        credentials: &Credentials,
        spec: &UserSpec,
    ) -> UpstreamResult<UserInfo> {
        self.enter(StoreOperation::AdminCreateUser).await?;
        let mut state = self.state.write().await;
        authorize(&state.users, credentials)?;

        if state.users.contains_key(&spec.user_id) {
            return Err(UpstreamError::AlreadyExists {
                resource: spec.user_id.clone(),
            });
        }
        let key = requested_key(
            &spec.user_id,
            spec.access_key.as_deref(),
            spec.secret_key.as_deref(),
            spec.generate_key,
        );
        if let Some(key) = &key {
            if key_in_use(&state.users, &key.access_key) {
                return Err(UpstreamError::AlreadyExists {
                    resource: key.access_key.clone(),
                });
            }
        }

        let info = UserInfo {
            user_id: spec.user_id.clone(),
            display_name: spec.display_name.clone().unwrap_or_default(),
            email: spec.email.clone().unwrap_or_default(),
            max_buckets: spec.max_buckets.unwrap_or(1000),
            suspended: spec.suspended.unwrap_or(false),
            admin: spec.admin.unwrap_or(false),
            keys: key.into_iter().collect(),
            bucket_quota: None,
            user_quota: None,
            stats: None,
        };
        state.users.insert(info.user_id.clone(), info.clone());
        debug!(uid = %info.user_id, "created user");
        Ok(info)
    }

    async fn update_user(
        &self,
        credentials: &Credentials,
        spec: &UserSpec,
    ) -> UpstreamResult<UserInfo> {
        self.enter(StoreOperation::AdminUpdateUser).await?;
        let mut state = self.state.write().await;
        authorize(&state.users, credentials)?;

        let user = state
            .users
            .get_mut(&spec.user_id)
            .ok_or_else(|| no_such_user(&spec.user_id))?;
        if let Some(display_name) = &spec.display_name {
            user.display_name = display_name.clone();
        }
        if let Some(email) = &spec.email {
            user.email = email.clone();
        }
        if let Some(max_buckets) = spec.max_buckets {
            user.max_buckets = max_buckets;
        }
        if let Some(suspended) = spec.suspended {
            user.suspended = suspended;
        }
        if let Some(admin) = spec.admin {
            user.admin = admin;
        }
        Ok(user.clone())
    }

    async fn delete_user(
        &self,
        credentials: &Credentials,
        uid: &str,
        _purge_data: bool,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::AdminDeleteUser).await?;
        let mut state = self.state.write().await;
        authorize(&state.users, credentials)?;
        state.users.remove(uid).ok_or_else(|| no_such_user(uid))?;
        Ok(())
    }

    async fn create_key(
        &self,
        credentials: &Credentials,
        uid: &str,
        spec: &UserKeySpec,
    ) -> UpstreamResult<Vec<UserKey>> {
        self.enter(StoreOperation::AdminCreateKey).await?;
        let mut state = self.state.write().await;
        authorize(&state.users, credentials)?;

        if !state.users.contains_key(uid) {
            return Err(no_such_user(uid));
        }
        let key = requested_key(
            uid,
            spec.access_key.as_deref(),
            spec.secret_key.as_deref(),
            spec.generate_key,
        );
        if let Some(key) = &key {
            if key_in_use(&state.users, &key.access_key) {
                return Err(UpstreamError::AlreadyExists {
                    resource: key.access_key.clone(),
                });
            }
        }

        let user = state.users.get_mut(uid).ok_or_else(|| no_such_user(uid))?;
        user.keys.extend(key);
        Ok(user.keys.clone())
    }

    async fn delete_key(
        &self,
        credentials: &Credentials,
        uid: &str,
        access_key: &str,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::AdminDeleteKey).await?;
        let mut state = self.state.write().await;
        authorize(&state.users, credentials)?;

        let user = state.users.get_mut(uid).ok_or_else(|| no_such_user(uid))?;
        let before = user.keys.len();
        user.keys.retain(|key| key.access_key != access_key);
        if user.keys.len() == before {
            return Err(UpstreamError::not_found(access_key, "InvalidAccessKeyId"));
        }
        Ok(())
    }

    async fn set_quota(
        &self,
        credentials: &Credentials,
        uid: &str,
        spec: &UserQuotaSpec,
    ) -> UpstreamResult<()> {
        self.enter(StoreOperation::AdminSetQuota).await?;
        let mut state = self.state.write().await;
        authorize(&state.users, credentials)?;

        let user = state.users.get_mut(uid).ok_or_else(|| no_such_user(uid))?;
        let quota = QuotaInfo {
            enabled: spec.enabled.unwrap_or(false),
            check_on_raw: false,
            max_size: spec.max_size.unwrap_or(-1),
            max_size_kb: spec.max_size.map_or(0, |size| size.max(0) / 1024),
            max_objects: spec.max_objects.unwrap_or(-1),
        };
        match spec.quota_type {
            QuotaType::User => user.user_quota = Some(quota),
            QuotaType::Bucket => user.bucket_quota = Some(quota),
        }
        Ok(())
    }

    async fn list_buckets(
        &self,
        credentials: &Credentials,
        uid: Option<&str>,
    ) -> UpstreamResult<Vec<AdminBucket>> {
        self.enter(StoreOperation::AdminListBuckets).await?;
        let state = self.state.read().await;
        authorize(&state.users, credentials)?;

        let owner = state.owner.id.as_str();
        if uid.is_some_and(|uid| uid != owner) {
            return Ok(Vec::new());
        }
        Ok(state
            .buckets
            .iter()
            .map(|(name, bucket_state)| admin_bucket(name, bucket_state, owner))
            .collect())
    }

    async fn bucket_info(
        &self,
        credentials: &Credentials,
        bucket: &BucketName,
    ) -> UpstreamResult<AdminBucket> {
        self.enter(StoreOperation::AdminBucketInfo).await?;
        let state = self.state.read().await;
        authorize(&state.users, credentials)?;
        let bucket_state = bucket_ref(&state.buckets, bucket)?;
        Ok(admin_bucket(bucket.as_str(), bucket_state, &state.owner.id))
    }
}
