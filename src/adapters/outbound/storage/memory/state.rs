use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::domain::models::{
    LegalHoldStatus, LifecycleConfiguration, ObjectLockConfiguration, RetentionMode, TagSet,
};

/// Version id S3 assigns to objects written while versioning is off
pub(super) const NULL_VERSION: &str = "null";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VersioningState {
    Unversioned,
    Enabled,
    Suspended,
}

#[derive(Debug, Clone)]
pub(super) struct StoredBody {
    pub data: Bytes,
    pub etag: String,
    pub content_type: Option<String>,
}

/// One version of a key; a version without a body is a delete marker
#[derive(Debug, Clone)]
pub(super) struct StoredVersion {
    pub version_id: String,
    pub body: Option<StoredBody>,
    pub last_modified: DateTime<Utc>,
    pub tags: TagSet,
    pub legal_hold: Option<LegalHoldStatus>,
    pub retention: Option<(RetentionMode, DateTime<Utc>)>,
}

impl StoredVersion {
    pub fn is_delete_marker(&self) -> bool {
        self.body.is_none()
    }

    pub fn size(&self) -> u64 {
        self.body.as_ref().map_or(0, |body| body.data.len() as u64)
    }

    /// Legal hold or unexpired retention forbids deleting this version
    pub fn is_protected(&self, now: DateTime<Utc>) -> bool {
        self.legal_hold == Some(LegalHoldStatus::On)
            || self
                .retention
                .is_some_and(|(_, retain_until)| retain_until > now)
    }
}

#[derive(Debug, Clone)]
pub(super) struct BucketState {
    pub created: DateTime<Utc>,
    /// Object lock can only be configured on buckets created with it
    pub object_lock_allowed: bool,
    pub versioning: VersioningState,
    pub object_lock: Option<ObjectLockConfiguration>,
    pub tags: Option<TagSet>,
    pub lifecycle: Option<LifecycleConfiguration>,
    /// Versions per key, oldest first
    pub objects: BTreeMap<String, Vec<StoredVersion>>,
}

impl BucketState {
    pub fn new(object_lock: bool) -> Self {
        Self {
            created: Utc::now(),
            object_lock_allowed: object_lock,
            // Object lock implies versioning
            versioning: if object_lock {
                VersioningState::Enabled
            } else {
                VersioningState::Unversioned
            },
            object_lock: object_lock.then_some(ObjectLockConfiguration {
                enabled: true,
                default_retention: None,
            }),
            tags: None,
            lifecycle: None,
            objects: BTreeMap::new(),
        }
    }

    pub fn next_version_id(&self) -> String {
        match self.versioning {
            VersioningState::Enabled => uuid::Uuid::new_v4().simple().to_string(),
            VersioningState::Unversioned | VersioningState::Suspended => {
                NULL_VERSION.to_string()
            }
        }
    }

    /// Append a version, replacing an existing `null` version of the key
    pub fn push_version(&mut self, key: &str, version: StoredVersion) {
        let versions = self.objects.entry(key.to_string()).or_default();
        if version.version_id == NULL_VERSION {
            versions.retain(|existing| existing.version_id != NULL_VERSION);
        }
        versions.push(version);
    }

    pub fn latest(&self, key: &str) -> Option<&StoredVersion> {
        self.objects.get(key).and_then(|versions| versions.last())
    }

    /// The given version, or the latest one when `version_id` is `None`
    pub fn find(&self, key: &str, version_id: Option<&str>) -> Option<&StoredVersion> {
        let versions = self.objects.get(key)?;
        match version_id {
            Some(id) => versions.iter().find(|v| v.version_id == id),
            None => versions.last(),
        }
    }

    pub fn find_mut(&mut self, key: &str, version_id: Option<&str>) -> Option<&mut StoredVersion> {
        let versions = self.objects.get_mut(key)?;
        match version_id {
            Some(id) => versions.iter_mut().find(|v| v.version_id == id),
            None => versions.last_mut(),
        }
    }

    /// Remove one version, dropping the key once no versions remain
    pub fn remove_version(&mut self, key: &str, version_id: &str) -> Option<StoredVersion> {
        let versions = self.objects.get_mut(key)?;
        let index = versions.iter().position(|v| v.version_id == version_id)?;
        let removed = versions.remove(index);
        if versions.is_empty() {
            self.objects.remove(key);
        }
        Some(removed)
    }

    /// Retention applied to new versions by the bucket's default rule
    pub fn default_retention(&self, now: DateTime<Utc>) -> Option<(RetentionMode, DateTime<Utc>)> {
        let rule = self.object_lock.as_ref()?.default_retention.as_ref()?;
        let days = match (rule.days, rule.years) {
            (_, Some(years)) if years > 0 => i64::from(years) * 365,
            (Some(days), _) => i64::from(days),
            _ => return None,
        };
        Some((rule.mode, now + Duration::days(days)))
    }
}
