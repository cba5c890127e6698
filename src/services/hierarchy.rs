use std::collections::HashSet;

use crate::domain::{
    models::{Entry, EntryKind, ListingRecord},
    value_objects::Delimiter,
};

/// Turns flat listing records into browsable entries.
///
/// Contents become `OBJECT` entries named after their last key segment;
/// common prefixes become synthetic `FOLDER` entries. Pure and deterministic.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    delimiter: Delimiter,
}

impl HierarchyBuilder {
    pub fn new(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    pub fn build(&self, records: &[ListingRecord]) -> Vec<Entry> {
        let mut folders_seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            match record {
                ListingRecord::Object(object) => {
                    if let Some(name) = self.delimiter.last_segment(&object.key) {
                        entries.push(Entry {
                            key: object.key.clone(),
                            name,
                            kind: EntryKind::Object,
                            version_id: None,
                            is_latest: true,
                            is_deleted: false,
                            size: Some(object.size),
                            etag: object.etag.clone(),
                            last_modified: object.last_modified,
                        });
                    }
                }
                ListingRecord::Version(version) => {
                    if let Some(name) = self.delimiter.last_segment(&version.key) {
                        entries.push(Entry {
                            key: version.key.clone(),
                            name,
                            kind: EntryKind::Object,
                            version_id: version.version_id.clone(),
                            is_latest: version.is_latest,
                            is_deleted: false,
                            size: Some(version.size),
                            etag: version.etag.clone(),
                            last_modified: version.last_modified,
                        });
                    }
                }
                ListingRecord::DeleteMarker(marker) => {
                    if let Some(name) = self.delimiter.last_segment(&marker.key) {
                        entries.push(Entry {
                            key: marker.key.clone(),
                            name,
                            kind: EntryKind::Object,
                            version_id: marker.version_id.clone(),
                            is_latest: marker.is_latest,
                            is_deleted: true,
                            size: Some(0),
                            etag: None,
                            last_modified: marker.last_modified,
                        });
                    }
                }
                ListingRecord::CommonPrefix(common) => {
                    let segments = self.delimiter.split_key(&common.prefix);
                    let Some(name) = segments.last().cloned() else {
                        continue;
                    };
                    let key = self.delimiter.build_key("", segments.as_slice());
                    if folders_seen.insert(key.clone()) {
                        entries.push(Entry::folder(key, name));
                    }
                }
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CommonPrefix, DeleteMarkerRecord, ObjectRecord, VersionRecord};

    fn object(key: &str, size: u64) -> ListingRecord {
        ListingRecord::Object(ObjectRecord {
            key: key.to_string(),
            size,
            etag: Some("\"abc\"".to_string()),
            last_modified: None,
        })
    }

    fn prefix(value: &str) -> ListingRecord {
        ListingRecord::CommonPrefix(CommonPrefix {
            prefix: value.to_string(),
        })
    }

    #[test]
    fn test_objects_and_folders() {
        let builder = HierarchyBuilder::default();
        let entries = builder.build(&[
            object("a/b.txt", 12),
            prefix("a/c/"),
            prefix("a/d/"),
        ]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].key, "a/b.txt");
        assert_eq!(entries[0].name, "b.txt");
        assert_eq!(entries[0].kind, EntryKind::Object);
        assert_eq!(entries[0].size, Some(12));

        assert_eq!(entries[1], Entry::folder("a/c".to_string(), "c".to_string()));
        assert_eq!(entries[2].key, "a/d");
        assert!(entries[2].size.is_none());
        assert!(entries[2].etag.is_none());
        assert!(entries[2].last_modified.is_none());
        assert!(entries[2].version_id.is_none());
    }

    #[test]
    fn test_folder_synthesis_is_idempotent() {
        let builder = HierarchyBuilder::default();
        let records = vec![prefix("x/"), object("x.txt", 1), prefix("x/"), prefix("y/")];

        let first = builder.build(&records);
        let second = builder.build(&records);

        assert_eq!(first, second);
        let folders: Vec<&str> = first
            .iter()
            .filter(|e| e.is_folder())
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(folders, vec!["x", "y"]);
    }

    #[test]
    fn test_delete_markers_are_deleted_objects() {
        let builder = HierarchyBuilder::default();
        let entries = builder.build(&[
            ListingRecord::DeleteMarker(DeleteMarkerRecord {
                key: "docs/report.pdf".to_string(),
                version_id: Some("v9".to_string()),
                is_latest: true,
                last_modified: None,
            }),
            ListingRecord::Version(VersionRecord {
                key: "docs/report.pdf".to_string(),
                version_id: Some("v8".to_string()),
                is_latest: false,
                size: 2048,
                etag: None,
                last_modified: None,
            }),
        ]);

        assert_eq!(entries[0].kind, EntryKind::Object);
        assert!(entries[0].is_deleted);
        assert_eq!(entries[0].size, Some(0));
        assert!(entries[0].is_latest);
        assert_eq!(entries[0].version_id.as_deref(), Some("v9"));

        assert!(!entries[1].is_deleted);
        assert!(!entries[1].is_latest);
        assert_eq!(entries[1].size, Some(2048));
    }

    #[test]
    fn test_root_key_is_skipped() {
        let builder = HierarchyBuilder::default();
        let entries = builder.build(&[object("/", 0), object("", 0), object("folder/", 0)]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "folder/");
        assert_eq!(entries[0].name, "folder");
    }

    #[test]
    fn test_custom_delimiter() {
        let builder = HierarchyBuilder::new(Delimiter::new("|").unwrap());
        let entries = builder.build(&[object("a|b|c", 1), prefix("a|d|")]);

        assert_eq!(entries[0].name, "c");
        assert_eq!(entries[1].key, "a|d");
        assert_eq!(entries[1].name, "d");
    }
}
