use chrono::{DateTime, Utc};

/// A current object reported by `ListObjectsV2`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One stored version reported by `ListObjectVersions`
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub key: String,
    pub version_id: Option<String>,
    pub is_latest: bool,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// A delete marker reported by `ListObjectVersions`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteMarkerRecord {
    pub key: String,
    pub version_id: Option<String>,
    pub is_latest: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

/// A rolled-up key prefix ending in the delimiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonPrefix {
    pub prefix: String,
}

/// Versions and delete markers, in the order the upstream interleaves them
#[derive(Debug, Clone, PartialEq)]
pub enum VersionEntry {
    Version(VersionRecord),
    DeleteMarker(DeleteMarkerRecord),
}

/// One page of a `ListObjectsV2` walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectsPage {
    pub contents: Vec<ObjectRecord>,
    pub common_prefixes: Vec<CommonPrefix>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

/// One page of a `ListObjectVersions` walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionsPage {
    pub entries: Vec<VersionEntry>,
    pub common_prefixes: Vec<CommonPrefix>,
    pub is_truncated: bool,
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

/// Resume point of a version listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionsCursor {
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

impl VersionsCursor {
    pub fn is_start(&self) -> bool {
        self.key_marker.is_none() && self.version_id_marker.is_none()
    }
}

/// A flattened listing record as accumulated across pages
#[derive(Debug, Clone, PartialEq)]
pub enum ListingRecord {
    Object(ObjectRecord),
    Version(VersionRecord),
    DeleteMarker(DeleteMarkerRecord),
    CommonPrefix(CommonPrefix),
}

impl ListingRecord {
    /// Key or prefix the record refers to
    pub fn key(&self) -> &str {
        match self {
            ListingRecord::Object(record) => &record.key,
            ListingRecord::Version(record) => &record.key,
            ListingRecord::DeleteMarker(record) => &record.key,
            ListingRecord::CommonPrefix(record) => &record.prefix,
        }
    }
}

impl From<VersionEntry> for ListingRecord {
    fn from(entry: VersionEntry) -> Self {
        match entry {
            VersionEntry::Version(record) => ListingRecord::Version(record),
            VersionEntry::DeleteMarker(record) => ListingRecord::DeleteMarker(record),
        }
    }
}

/// Parameters shared by every page request of one listing walk
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct ListingQuery {
    #[builder(into)]
    pub bucket: String,
    #[builder(into)]
    pub prefix: Option<String>,
    #[builder(into)]
    pub delimiter: Option<String>,
    pub max_keys: Option<u32>,
}
