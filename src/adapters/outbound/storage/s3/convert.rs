//! Conversions between SDK shapes and domain models

use aws_sdk_s3::{
    error::BuildError,
    operation::{
        delete_objects::DeleteObjectsOutput, head_object::HeadObjectOutput,
        list_object_versions::ListObjectVersionsOutput, list_objects_v2::ListObjectsV2Output,
    },
    primitives::DateTime as SdkDateTime,
    types as sdk,
};
use chrono::{DateTime, Utc};

use crate::domain::models::{
    CommonPrefix, DefaultRetention, DeleteCandidate, DeleteFailure, DeleteMarkerRecord,
    DeleteObjectsOutcome, DeletedObject, LegalHoldStatus, LifecycleConfiguration,
    LifecycleExpiration, LifecycleFilter, LifecycleRule, NoncurrentVersionExpiration,
    ObjectHead, ObjectLockConfiguration, ObjectRecord, ObjectsPage, RetentionMode, RuleStatus,
    Tag, TagSet, VersionEntry, VersionRecord, VersionsPage,
};

pub fn to_utc(timestamp: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

pub fn from_utc(timestamp: &DateTime<Utc>) -> SdkDateTime {
    SdkDateTime::from_secs(timestamp.timestamp())
}

fn size(value: Option<i64>) -> u64 {
    value.and_then(|size| u64::try_from(size).ok()).unwrap_or(0)
}

fn non_negative(value: Option<i32>) -> Option<u32> {
    value.and_then(|value| u32::try_from(value).ok())
}

fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn common_prefixes(prefixes: &[sdk::CommonPrefix]) -> Vec<CommonPrefix> {
    prefixes
        .iter()
        .filter_map(|prefix| prefix.prefix())
        .map(|prefix| CommonPrefix {
            prefix: prefix.to_string(),
        })
        .collect()
}

pub fn objects_page(output: &ListObjectsV2Output) -> ObjectsPage {
    ObjectsPage {
        contents: output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectRecord {
                    key: object.key()?.to_string(),
                    size: size(object.size()),
                    etag: object.e_tag().map(str::to_string),
                    last_modified: object.last_modified().and_then(to_utc),
                })
            })
            .collect(),
        common_prefixes: common_prefixes(output.common_prefixes()),
        is_truncated: output.is_truncated().unwrap_or(false),
        next_continuation_token: output.next_continuation_token().map(str::to_string),
    }
}

/// Versions and delete markers come back in separate lists; merge them by
/// key, newest first within a key
pub fn versions_page(output: &ListObjectVersionsOutput) -> VersionsPage {
    let versions = output.versions().iter().filter_map(|version| {
        Some(VersionEntry::Version(VersionRecord {
            key: version.key()?.to_string(),
            version_id: version.version_id().map(str::to_string),
            is_latest: version.is_latest().unwrap_or(false),
            size: size(version.size()),
            etag: version.e_tag().map(str::to_string),
            last_modified: version.last_modified().and_then(to_utc),
        }))
    });
    let markers = output.delete_markers().iter().filter_map(|marker| {
        Some(VersionEntry::DeleteMarker(DeleteMarkerRecord {
            key: marker.key()?.to_string(),
            version_id: marker.version_id().map(str::to_string),
            is_latest: marker.is_latest().unwrap_or(false),
            last_modified: marker.last_modified().and_then(to_utc),
        }))
    });

    let mut entries: Vec<VersionEntry> = versions.chain(markers).collect();
    entries.sort_by(|a, b| {
        entry_key(a)
            .cmp(entry_key(b))
            .then_with(|| entry_modified(b).cmp(&entry_modified(a)))
    });

    VersionsPage {
        entries,
        common_prefixes: common_prefixes(output.common_prefixes()),
        is_truncated: output.is_truncated().unwrap_or(false),
        next_key_marker: output.next_key_marker().map(str::to_string),
        next_version_id_marker: output.next_version_id_marker().map(str::to_string),
    }
}

fn entry_key(entry: &VersionEntry) -> &str {
    match entry {
        VersionEntry::Version(record) => &record.key,
        VersionEntry::DeleteMarker(record) => &record.key,
    }
}

fn entry_modified(entry: &VersionEntry) -> Option<DateTime<Utc>> {
    match entry {
        VersionEntry::Version(record) => record.last_modified,
        VersionEntry::DeleteMarker(record) => record.last_modified,
    }
}

pub fn object_head(key: &str, output: &HeadObjectOutput) -> ObjectHead {
    ObjectHead {
        key: key.to_string(),
        version_id: output.version_id().map(str::to_string),
        size: size(output.content_length()),
        etag: output.e_tag().map(str::to_string),
        last_modified: output.last_modified().and_then(to_utc),
        content_type: output.content_type().map(str::to_string),
        retention_mode: output
            .object_lock_mode()
            .and_then(|mode| RetentionMode::parse(mode.as_str())),
        retain_until: output.object_lock_retain_until_date().and_then(to_utc),
        legal_hold: output
            .object_lock_legal_hold_status()
            .and_then(|status| LegalHoldStatus::parse(status.as_str())),
    }
}

pub fn object_lock(config: &sdk::ObjectLockConfiguration) -> ObjectLockConfiguration {
    let default_retention = config
        .rule()
        .and_then(|rule| rule.default_retention())
        .and_then(|retention| {
            Some(DefaultRetention {
                mode: RetentionMode::parse(retention.mode()?.as_str())?,
                days: non_negative(retention.days()),
                years: non_negative(retention.years()),
            })
        });

    ObjectLockConfiguration {
        enabled: config.object_lock_enabled() == Some(&sdk::ObjectLockEnabled::Enabled),
        default_retention,
    }
}

pub fn object_lock_document(config: &ObjectLockConfiguration) -> sdk::ObjectLockConfiguration {
    let rule = config.default_retention.as_ref().map(|retention| {
        sdk::ObjectLockRule::builder()
            .default_retention(
                sdk::DefaultRetention::builder()
                    .mode(sdk::ObjectLockRetentionMode::from(retention.mode.as_str()))
                    .set_days(retention.days.map(signed))
                    .set_years(retention.years.map(signed))
                    .build(),
            )
            .build()
    });

    sdk::ObjectLockConfiguration::builder()
        .set_object_lock_enabled(config.enabled.then_some(sdk::ObjectLockEnabled::Enabled))
        .set_rule(rule)
        .build()
}

pub fn tag_set(tags: &[sdk::Tag]) -> TagSet {
    tags.iter()
        .map(|tag| Tag::new(tag.key(), tag.value()))
        .collect()
}

pub fn tagging_document(tags: &TagSet) -> Result<sdk::Tagging, BuildError> {
    let tags = tags
        .tags()
        .iter()
        .map(|tag| sdk::Tag::builder().key(&tag.key).value(&tag.value).build())
        .collect::<Result<Vec<_>, _>>()?;
    sdk::Tagging::builder().set_tag_set(Some(tags)).build()
}

pub fn legal_hold(hold: &sdk::ObjectLockLegalHold) -> Option<LegalHoldStatus> {
    hold.status()
        .and_then(|status| LegalHoldStatus::parse(status.as_str()))
}

pub fn legal_hold_document(status: LegalHoldStatus) -> sdk::ObjectLockLegalHold {
    sdk::ObjectLockLegalHold::builder()
        .status(sdk::ObjectLockLegalHoldStatus::from(status.as_str()))
        .build()
}

#[allow(deprecated)]
fn lifecycle_rule(rule: &sdk::LifecycleRule) -> LifecycleRule {
    LifecycleRule {
        id: rule.id().map(str::to_string),
        status: match rule.status() {
            sdk::ExpirationStatus::Enabled => RuleStatus::Enabled,
            _ => RuleStatus::Disabled,
        },
        prefix: rule.prefix().map(str::to_string),
        filter: rule.filter().map(|filter| LifecycleFilter {
            prefix: filter.prefix().map(str::to_string),
            tag: filter.tag().map(|tag| Tag::new(tag.key(), tag.value())),
        }),
        expiration: rule.expiration().map(|expiration| LifecycleExpiration {
            date: expiration.date().and_then(to_utc),
            days: non_negative(expiration.days()),
            expired_object_delete_marker: expiration.expired_object_delete_marker(),
        }),
        noncurrent_version_expiration: rule.noncurrent_version_expiration().and_then(|nve| {
            Some(NoncurrentVersionExpiration {
                noncurrent_days: non_negative(nve.noncurrent_days())?,
            })
        }),
    }
}

pub fn lifecycle(rules: &[sdk::LifecycleRule]) -> LifecycleConfiguration {
    LifecycleConfiguration {
        rules: rules.iter().map(lifecycle_rule).collect(),
    }
}

#[allow(deprecated)]
fn lifecycle_rule_document(rule: &LifecycleRule) -> Result<sdk::LifecycleRule, BuildError> {
    let filter = match &rule.filter {
        Some(filter) => {
            let tag = filter
                .tag
                .as_ref()
                .map(|tag| sdk::Tag::builder().key(&tag.key).value(&tag.value).build())
                .transpose()?;
            Some(
                sdk::LifecycleRuleFilter::builder()
                    .set_prefix(filter.prefix.clone())
                    .set_tag(tag)
                    .build(),
            )
        }
        None => None,
    };

    sdk::LifecycleRule::builder()
        .set_id(rule.id.clone())
        .status(sdk::ExpirationStatus::from(rule.status.as_str()))
        .set_prefix(rule.prefix.clone())
        .set_filter(filter)
        .set_expiration(rule.expiration.as_ref().map(|expiration| {
            sdk::LifecycleExpiration::builder()
                .set_date(expiration.date.as_ref().map(from_utc))
                .set_days(expiration.days.map(signed))
                .set_expired_object_delete_marker(expiration.expired_object_delete_marker)
                .build()
        }))
        .set_noncurrent_version_expiration(rule.noncurrent_version_expiration.as_ref().map(
            |nve| {
                sdk::NoncurrentVersionExpiration::builder()
                    .noncurrent_days(signed(nve.noncurrent_days))
                    .build()
            },
        ))
        .build()
}

pub fn lifecycle_document(
    config: &LifecycleConfiguration,
) -> Result<sdk::BucketLifecycleConfiguration, BuildError> {
    let rules = config
        .rules
        .iter()
        .map(lifecycle_rule_document)
        .collect::<Result<Vec<_>, _>>()?;
    sdk::BucketLifecycleConfiguration::builder()
        .set_rules(Some(rules))
        .build()
}

pub fn delete_document(candidates: &[DeleteCandidate]) -> Result<sdk::Delete, BuildError> {
    let objects = candidates
        .iter()
        .map(|candidate| {
            sdk::ObjectIdentifier::builder()
                .key(&candidate.key)
                .set_version_id(candidate.version_id.clone())
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;
    sdk::Delete::builder()
        .set_objects(Some(objects))
        .quiet(false)
        .build()
}

pub fn delete_outcome(output: &DeleteObjectsOutput) -> DeleteObjectsOutcome {
    DeleteObjectsOutcome {
        deleted: output
            .deleted()
            .iter()
            .map(|deleted| DeletedObject {
                key: deleted.key().unwrap_or_default().to_string(),
                version_id: deleted.version_id().map(str::to_string),
                delete_marker: deleted.delete_marker().unwrap_or(false),
                delete_marker_version_id: deleted.delete_marker_version_id().map(str::to_string),
            })
            .collect(),
        errors: output
            .errors()
            .iter()
            .map(|error| DeleteFailure {
                key: error.key().unwrap_or_default().to_string(),
                version_id: error.version_id().map(str::to_string),
                code: error.code().unwrap_or("InternalError").to_string(),
                message: error.message().unwrap_or_default().to_string(),
            })
            .collect(),
    }
}

/// `CopySource` of a self-copy: bucket and percent-encoded key, plus the version
pub fn copy_source(bucket: &str, key: &str, version_id: Option<&str>) -> String {
    let key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    match version_id {
        Some(version_id) => format!(
            "{}/{}?versionId={}",
            bucket,
            key,
            urlencoding::encode(version_id)
        ),
        None => format!("{}/{}", bucket, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> SdkDateTime {
        SdkDateTime::from_secs(secs)
    }

    #[test]
    fn test_versions_and_markers_merge_by_key_newest_first() {
        let output = ListObjectVersionsOutput::builder()
            .versions(
                sdk::ObjectVersion::builder()
                    .key("a.txt")
                    .version_id("v1")
                    .last_modified(at(100))
                    .build(),
            )
            .versions(
                sdk::ObjectVersion::builder()
                    .key("b.txt")
                    .version_id("v3")
                    .is_latest(true)
                    .size(4)
                    .last_modified(at(300))
                    .build(),
            )
            .delete_markers(
                sdk::DeleteMarkerEntry::builder()
                    .key("a.txt")
                    .version_id("m1")
                    .is_latest(true)
                    .last_modified(at(200))
                    .build(),
            )
            .is_truncated(true)
            .next_key_marker("b.txt")
            .next_version_id_marker("v3")
            .build();

        let page = versions_page(&output);
        let order: Vec<(&str, bool)> = page
            .entries
            .iter()
            .map(|entry| match entry {
                VersionEntry::Version(v) => (v.version_id.as_deref().unwrap_or(""), false),
                VersionEntry::DeleteMarker(m) => (m.version_id.as_deref().unwrap_or(""), true),
            })
            .collect();
        assert_eq!(order, vec![("m1", true), ("v1", false), ("v3", false)]);
        assert!(page.is_truncated);
        assert_eq!(page.next_key_marker.as_deref(), Some("b.txt"));
    }

    #[test]
    fn test_object_lock_round_trips_retention() {
        let config = ObjectLockConfiguration {
            enabled: true,
            default_retention: Some(DefaultRetention {
                mode: RetentionMode::Compliance,
                days: None,
                years: Some(2),
            }),
        };
        assert_eq!(object_lock(&object_lock_document(&config)), config);

        let bare = sdk::ObjectLockConfiguration::builder()
            .object_lock_enabled(sdk::ObjectLockEnabled::Enabled)
            .build();
        assert_eq!(
            object_lock(&bare),
            ObjectLockConfiguration {
                enabled: true,
                default_retention: None,
            }
        );
    }

    #[test]
    fn test_empty_tag_set_still_builds() {
        let tagging = tagging_document(&TagSet::empty()).unwrap();
        assert!(tagging.tag_set().is_empty());

        let tags = TagSet::new(vec![Tag::new("team", "ops")]);
        assert_eq!(tag_set(tagging_document(&tags).unwrap().tag_set()), tags);
    }

    #[test]
    fn test_lifecycle_filter_conversion() {
        let config = LifecycleConfiguration {
            rules: vec![LifecycleRule {
                id: Some("expire-logs".to_string()),
                status: RuleStatus::Enabled,
                prefix: None,
                filter: Some(LifecycleFilter {
                    prefix: Some("logs/".to_string()),
                    tag: None,
                }),
                expiration: Some(LifecycleExpiration {
                    days: Some(30),
                    ..Default::default()
                }),
                noncurrent_version_expiration: Some(NoncurrentVersionExpiration {
                    noncurrent_days: 7,
                }),
            }],
        };

        let document = lifecycle_document(&config).unwrap();
        assert_eq!(lifecycle(document.rules()), config);
    }

    #[test]
    fn test_copy_source_encoding() {
        assert_eq!(
            copy_source("photos", "2024/a b.jpg", None),
            "photos/2024/a%20b.jpg"
        );
        assert_eq!(
            copy_source("photos", "k", Some("3/L4kqtJl")),
            "photos/k?versionId=3%2FL4kqtJl"
        );
    }

    #[test]
    fn test_delete_outcome_splits_failures() {
        let output = DeleteObjectsOutput::builder()
            .deleted(
                sdk::DeletedObject::builder()
                    .key("a.txt")
                    .delete_marker(true)
                    .delete_marker_version_id("m1")
                    .build(),
            )
            .errors(
                sdk::Error::builder()
                    .key("b.txt")
                    .code("AccessDenied")
                    .message("denied")
                    .build(),
            )
            .build();

        let outcome = delete_outcome(&output);
        assert_eq!(outcome.deleted.len(), 1);
        assert!(outcome.deleted[0].delete_marker);
        assert_eq!(outcome.errors[0].code, "AccessDenied");
        assert_eq!(outcome.errors[0].key, "b.txt");
    }
}
