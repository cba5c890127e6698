use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an entry is a real object or a folder synthesized from a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "OBJECT")]
    Object,
    #[serde(rename = "FOLDER")]
    Folder,
}

/// Listing entry as presented to the UI.
///
/// Folders only carry `key` and `name`; size, etag, modification time and
/// version id are always unset for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Entry {
    pub key: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub is_latest: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,
    #[serde(rename = "ETag", skip_serializing_if = "Option::is_none", default)]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn folder(key: String, name: String) -> Self {
        Self {
            key,
            name,
            kind: EntryKind::Folder,
            version_id: None,
            is_latest: false,
            is_deleted: false,
            size: None,
            etag: None,
            last_modified: None,
        }
    }

    pub fn is_object(&self) -> bool {
        self.kind == EntryKind::Object
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// A current, non-deleted object
    pub fn is_live(&self) -> bool {
        self.is_object() && self.is_latest && !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_serializes_without_object_fields() {
        let folder = Entry::folder("a/c".to_string(), "c".to_string());
        let json = serde_json::to_value(&folder).unwrap();

        assert_eq!(json["Key"], "a/c");
        assert_eq!(json["Name"], "c");
        assert_eq!(json["Type"], "FOLDER");
        assert!(json.get("Size").is_none());
        assert!(json.get("ETag").is_none());
        assert!(json.get("VersionId").is_none());
    }
}
