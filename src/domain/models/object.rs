use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{RetentionMode, TagSet};

/// Bucket as reported by `ListBuckets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegalHoldStatus {
    On,
    Off,
}

impl LegalHoldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegalHoldStatus::On => "ON",
            LegalHoldStatus::Off => "OFF",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ON" => Some(LegalHoldStatus::On),
            "OFF" => Some(LegalHoldStatus::Off),
            _ => None,
        }
    }
}

/// Object metadata returned by `HeadObject`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHead {
    pub key: String,
    pub version_id: Option<String>,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub retention_mode: Option<RetentionMode>,
    pub retain_until: Option<DateTime<Utc>>,
    pub legal_hold: Option<LegalHoldStatus>,
}

/// Aggregate record of one object (version)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectAttributes {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub size: u64,
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub tag_set: TagSet,
    #[serde(rename = "ObjectLockLegalHoldStatus", default)]
    pub legal_hold: Option<LegalHoldStatus>,
    #[serde(rename = "ObjectLockMode", default)]
    pub retention_mode: Option<RetentionMode>,
    #[serde(rename = "ObjectLockRetainUntilDate", default)]
    pub retain_until: Option<DateTime<Utc>>,
}

/// Requested changes to an object's mutable attributes.
///
/// Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectAttributesUpdate {
    #[serde(default)]
    pub tag_set: Option<TagSet>,
    #[serde(default)]
    pub legal_hold: Option<LegalHoldStatus>,
}
