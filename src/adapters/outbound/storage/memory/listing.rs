use std::collections::BTreeMap;

use super::state::StoredVersion;
use crate::domain::models::{
    CommonPrefix, DeleteMarkerRecord, ListingQuery, ObjectRecord, ObjectsPage, VersionEntry,
    VersionRecord, VersionsCursor, VersionsPage,
};

/// A listed key, or keys rolled up under a common prefix
#[derive(Debug, PartialEq)]
enum Item<'a> {
    Key(&'a str),
    Prefix(String),
}

impl Item<'_> {
    fn marker(&self) -> &str {
        match self {
            Item::Key(key) => key,
            Item::Prefix(prefix) => prefix,
        }
    }
}

/// Keys below `prefix` in order, with everything past the next delimiter
/// collapsed into one common prefix.
fn roll_up<'a>(
    keys: impl Iterator<Item = &'a String>,
    prefix: &str,
    delimiter: Option<&str>,
) -> Vec<Item<'a>> {
    let mut items: Vec<Item<'a>> = Vec::new();

    for key in keys.filter(|key| key.starts_with(prefix)) {
        let rest = &key[prefix.len()..];
        let rolled = delimiter
            .filter(|d| !d.is_empty())
            .and_then(|d| rest.find(d).map(|pos| &key[..prefix.len() + pos + d.len()]));

        match rolled {
            Some(common) => {
                // Keys sharing a common prefix are contiguous in sorted order
                if !matches!(items.last(), Some(Item::Prefix(last)) if last == common) {
                    items.push(Item::Prefix(common.to_string()));
                }
            }
            None => items.push(Item::Key(key.as_str())),
        }
    }

    items
}

fn page_limit(query: &ListingQuery, page_size: usize) -> usize {
    query
        .max_keys
        .map(|max| max as usize)
        .unwrap_or(page_size)
        .min(page_size)
        .max(1)
}

/// One `ListObjectsV2` page; the continuation token is the last item listed
pub(super) fn objects_page(
    objects: &BTreeMap<String, Vec<StoredVersion>>,
    query: &ListingQuery,
    continuation_token: Option<&str>,
    page_size: usize,
) -> ObjectsPage {
    let live_keys = objects
        .iter()
        .filter(|(_, versions)| versions.last().is_some_and(|v| !v.is_delete_marker()))
        .map(|(key, _)| key);
    let items = roll_up(
        live_keys,
        query.prefix.as_deref().unwrap_or(""),
        query.delimiter.as_deref(),
    );

    let remaining: Vec<&Item> = items
        .iter()
        .filter(|item| continuation_token.map_or(true, |token| item.marker() > token))
        .collect();
    let limit = page_limit(query, page_size);
    let is_truncated = remaining.len() > limit;

    let mut page = ObjectsPage {
        is_truncated,
        ..Default::default()
    };

    for item in remaining.iter().take(limit) {
        match item {
            Item::Key(key) => {
                let Some(latest) = objects.get(*key).and_then(|versions| versions.last()) else {
                    continue;
                };
                page.contents.push(ObjectRecord {
                    key: key.to_string(),
                    size: latest.size(),
                    etag: latest.body.as_ref().map(|body| body.etag.clone()),
                    last_modified: Some(latest.last_modified),
                });
            }
            Item::Prefix(prefix) => page.common_prefixes.push(CommonPrefix {
                prefix: prefix.clone(),
            }),
        }
    }

    if is_truncated {
        page.next_continuation_token = remaining
            .get(limit - 1)
            .map(|item| item.marker().to_string());
    }
    page
}

/// A version listing row: one version of a key, or a common prefix
enum Row<'a> {
    Version {
        key: &'a str,
        version: &'a StoredVersion,
        is_latest: bool,
    },
    Prefix(String),
}

impl Row<'_> {
    fn key(&self) -> &str {
        match self {
            Row::Version { key, .. } => key,
            Row::Prefix(prefix) => prefix,
        }
    }

    fn version_id(&self) -> Option<&str> {
        match self {
            Row::Version { version, .. } => Some(&version.version_id),
            Row::Prefix(_) => None,
        }
    }
}

/// One `ListObjectVersions` page; versions of a key are listed newest first
pub(super) fn versions_page(
    objects: &BTreeMap<String, Vec<StoredVersion>>,
    query: &ListingQuery,
    cursor: &VersionsCursor,
    page_size: usize,
) -> VersionsPage {
    let items = roll_up(
        objects.keys(),
        query.prefix.as_deref().unwrap_or(""),
        query.delimiter.as_deref(),
    );

    let rows: Vec<Row> = items
        .into_iter()
        .flat_map(|item| match item {
            Item::Key(key) => objects
                .get(key)
                .into_iter()
                .flat_map(|versions| {
                    versions
                        .iter()
                        .rev()
                        .enumerate()
                        .map(move |(index, version)| Row::Version {
                            key,
                            version,
                            is_latest: index == 0,
                        })
                })
                .collect::<Vec<_>>(),
            Item::Prefix(prefix) => vec![Row::Prefix(prefix)],
        })
        .collect();

    let start = match (&cursor.key_marker, &cursor.version_id_marker) {
        (None, _) => 0,
        (Some(key_marker), version_marker) => version_marker
            .as_deref()
            .and_then(|marker| {
                rows.iter().position(|row| {
                    row.key() == key_marker && row.version_id() == Some(marker)
                })
            })
            .map(|index| index + 1)
            .unwrap_or_else(|| {
                rows.iter()
                    .position(|row| row.key() > key_marker.as_str())
                    .unwrap_or(rows.len())
            }),
    };

    let limit = page_limit(query, page_size);
    let remaining = &rows[start.min(rows.len())..];
    let is_truncated = remaining.len() > limit;

    let mut page = VersionsPage {
        is_truncated,
        ..Default::default()
    };

    for row in remaining.iter().take(limit) {
        match row {
            Row::Version {
                key,
                version,
                is_latest,
            } => {
                let entry = match &version.body {
                    Some(body) => VersionEntry::Version(VersionRecord {
                        key: key.to_string(),
                        version_id: Some(version.version_id.clone()),
                        is_latest: *is_latest,
                        size: body.data.len() as u64,
                        etag: Some(body.etag.clone()),
                        last_modified: Some(version.last_modified),
                    }),
                    None => VersionEntry::DeleteMarker(DeleteMarkerRecord {
                        key: key.to_string(),
                        version_id: Some(version.version_id.clone()),
                        is_latest: *is_latest,
                        last_modified: Some(version.last_modified),
                    }),
                };
                page.entries.push(entry);
            }
            Row::Prefix(prefix) => page.common_prefixes.push(CommonPrefix {
                prefix: prefix.clone(),
            }),
        }
    }

    if is_truncated {
        if let Some(last) = remaining.get(limit - 1) {
            page.next_key_marker = Some(last.key().to_string());
            page.next_version_id_marker = last.version_id().map(str::to_string);
        }
    }
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TagSet;
    use bytes::Bytes;
    use chrono::Utc;

    use super::super::state::StoredBody;

    fn version(id: &str, data: Option<&'static str>) -> StoredVersion {
        StoredVersion {
            version_id: id.to_string(),
            body: data.map(|data| StoredBody {
                data: Bytes::from_static(data.as_bytes()),
                etag: format!("\"{:x}\"", md5::compute(data)),
                content_type: None,
            }),
            last_modified: Utc::now(),
            tags: TagSet::empty(),
            legal_hold: None,
            retention: None,
        }
    }

    fn objects(entries: &[(&str, Vec<StoredVersion>)]) -> BTreeMap<String, Vec<StoredVersion>> {
        entries
            .iter()
            .map(|(key, versions)| (key.to_string(), versions.clone()))
            .collect()
    }

    fn query(prefix: Option<&str>, max_keys: Option<u32>) -> ListingQuery {
        ListingQuery::builder()
            .bucket("b")
            .maybe_prefix(prefix)
            .delimiter("/")
            .maybe_max_keys(max_keys)
            .build()
    }

    #[test]
    fn test_roll_up_groups_by_delimiter() {
        let keys: Vec<String> = ["a.txt", "a/b.txt", "a/c/d.txt", "a0", "b/x"]
            .iter()
            .map(|k| k.to_string())
            .collect();

        let top = roll_up(keys.iter(), "", Some("/"));
        assert_eq!(
            top,
            vec![
                Item::Key("a.txt"),
                Item::Prefix("a/".to_string()),
                Item::Key("a0"),
                Item::Prefix("b/".to_string()),
            ]
        );

        let nested = roll_up(keys.iter(), "a/", Some("/"));
        assert_eq!(
            nested,
            vec![Item::Key("a/b.txt"), Item::Prefix("a/c/".to_string())]
        );
    }

    #[test]
    fn test_objects_page_skips_delete_markers_and_paginates() {
        let store = objects(&[
            ("a.txt", vec![version("null", Some("1"))]),
            ("b.txt", vec![version("v1", Some("2")), version("v2", None)]),
            ("c.txt", vec![version("null", Some("3"))]),
            ("d/e.txt", vec![version("null", Some("4"))]),
        ]);

        let first = objects_page(&store, &query(None, Some(2)), None, 1000);
        assert!(first.is_truncated);
        assert_eq!(first.contents.len(), 2);
        assert_eq!(first.next_continuation_token.as_deref(), Some("c.txt"));

        let second = objects_page(&store, &query(None, Some(2)), Some("c.txt"), 1000);
        assert!(!second.is_truncated);
        assert!(second.contents.is_empty());
        assert_eq!(second.common_prefixes[0].prefix, "d/");
        assert!(second.next_continuation_token.is_none());
    }

    #[test]
    fn test_versions_page_lists_newest_first_and_resumes() {
        let store = objects(&[(
            "a.txt",
            vec![
                version("v1", Some("old")),
                version("v2", Some("new")),
                version("v3", None),
            ],
        )]);

        let first = versions_page(&store, &query(None, Some(2)), &VersionsCursor::default(), 1000);
        assert!(first.is_truncated);
        assert!(matches!(
            &first.entries[0],
            VersionEntry::DeleteMarker(marker) if marker.is_latest
        ));
        assert!(matches!(
            &first.entries[1],
            VersionEntry::Version(v) if v.version_id.as_deref() == Some("v2") && !v.is_latest
        ));

        let cursor = VersionsCursor {
            key_marker: first.next_key_marker.clone(),
            version_id_marker: first.next_version_id_marker.clone(),
        };
        let second = versions_page(&store, &query(None, Some(2)), &cursor, 1000);
        assert!(!second.is_truncated);
        assert_eq!(second.entries.len(), 1);
        assert!(matches!(
            &second.entries[0],
            VersionEntry::Version(v) if v.version_id.as_deref() == Some("v1")
        ));
    }
}
