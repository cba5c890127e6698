use std::sync::Arc;
use tracing::debug;

use crate::{
    domain::{
        errors::{UpstreamError, UpstreamResult},
        models::{ListingQuery, ListingRecord, VersionsCursor},
    },
    ports::storage::ListingStore,
};

/// Drains cursor-paginated listings into one ordered record sequence.
///
/// Records keep upstream order: within a page, contents (or versions and
/// delete markers) come first, followed by common prefixes. Any page
/// failure aborts the walk; partial results are never returned.
pub struct PaginationWalker<S: ListingStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ListingStore + ?Sized> PaginationWalker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Walk `ListObjectsV2` pages until the listing is no longer truncated
    pub async fn walk_objects(&self, query: &ListingQuery) -> UpstreamResult<Vec<ListingRecord>> {
        let mut records = Vec::new();
        let mut token: Option<String> = None;
        let mut page_number = 0usize;

        loop {
            let page = self.store.list_objects(query, token.as_deref()).await?;
            page_number += 1;
            debug!(
                bucket = %query.bucket,
                page = page_number,
                contents = page.contents.len(),
                prefixes = page.common_prefixes.len(),
                "fetched object listing page"
            );

            records.extend(page.contents.into_iter().map(ListingRecord::Object));
            records.extend(
                page.common_prefixes
                    .into_iter()
                    .map(ListingRecord::CommonPrefix),
            );

            if !page.is_truncated {
                break;
            }
            match page.next_continuation_token {
                Some(next) => token = Some(next),
                None => return Err(missing_cursor(&query.bucket, page_number)),
            }
        }

        Ok(records)
    }

    /// Walk `ListObjectVersions` pages until the listing is no longer truncated
    pub async fn walk_versions(&self, query: &ListingQuery) -> UpstreamResult<Vec<ListingRecord>> {
        let mut records = Vec::new();
        let mut cursor = VersionsCursor::default();
        let mut page_number = 0usize;

        loop {
            let page = self.store.list_object_versions(query, &cursor).await?;
            page_number += 1;
            debug!(
                bucket = %query.bucket,
                page = page_number,
                entries = page.entries.len(),
                prefixes = page.common_prefixes.len(),
                "fetched version listing page"
            );

            records.extend(page.entries.into_iter().map(ListingRecord::from));
            records.extend(
                page.common_prefixes
                    .into_iter()
                    .map(ListingRecord::CommonPrefix),
            );

            if !page.is_truncated {
                break;
            }
            if page.next_key_marker.is_none() {
                return Err(missing_cursor(&query.bucket, page_number));
            }
            cursor = VersionsCursor {
                key_marker: page.next_key_marker,
                version_id_marker: page.next_version_id_marker,
            };
        }

        Ok(records)
    }
}

fn missing_cursor(bucket: &str, page_number: usize) -> UpstreamError {
    UpstreamError::unknown(
        "MissingContinuation",
        format!(
            "listing of '{}' was truncated at page {} without a cursor",
            bucket, page_number
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        CommonPrefix, DeleteMarkerRecord, ObjectRecord, ObjectsPage, VersionEntry,
        VersionRecord, VersionsPage,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves pre-built pages and records the cursors it was asked for
    #[derive(Default)]
    struct ScriptedListing {
        object_pages: Vec<UpstreamResult<ObjectsPage>>,
        version_pages: Vec<VersionsPage>,
        seen_tokens: Mutex<Vec<Option<String>>>,
        seen_cursors: Mutex<Vec<VersionsCursor>>,
    }

    #[async_trait]
    impl ListingStore for ScriptedListing {
        async fn list_objects(
            &self,
            _query: &ListingQuery,
            continuation_token: Option<&str>,
        ) -> UpstreamResult<ObjectsPage> {
            let mut seen = self.seen_tokens.lock().unwrap();
            let index = seen.len();
            seen.push(continuation_token.map(str::to_string));
            self.object_pages[index].clone()
        }

        async fn list_object_versions(
            &self,
            _query: &ListingQuery,
            cursor: &VersionsCursor,
        ) -> UpstreamResult<VersionsPage> {
            let mut seen = self.seen_cursors.lock().unwrap();
            let index = seen.len();
            seen.push(cursor.clone());
            Ok(self.version_pages[index].clone())
        }
    }

    fn object(key: &str) -> ObjectRecord {
        ObjectRecord {
            key: key.to_string(),
            size: 1,
            etag: None,
            last_modified: None,
        }
    }

    fn prefix(value: &str) -> CommonPrefix {
        CommonPrefix {
            prefix: value.to_string(),
        }
    }

    fn query() -> ListingQuery {
        ListingQuery::builder()
            .bucket("photos")
            .delimiter("/")
            .build()
    }

    #[tokio::test]
    async fn test_walk_objects_concatenates_pages_in_order() {
        let store = Arc::new(ScriptedListing {
            object_pages: vec![
                Ok(ObjectsPage {
                    contents: vec![object("a.txt"), object("b.txt")],
                    common_prefixes: vec![prefix("docs/")],
                    is_truncated: true,
                    next_continuation_token: Some("t1".to_string()),
                }),
                Ok(ObjectsPage {
                    contents: vec![object("c.txt")],
                    common_prefixes: vec![],
                    is_truncated: true,
                    next_continuation_token: Some("t2".to_string()),
                }),
                Ok(ObjectsPage {
                    contents: vec![object("d.txt")],
                    common_prefixes: vec![prefix("img/")],
                    is_truncated: false,
                    next_continuation_token: None,
                }),
            ],
            ..Default::default()
        });

        let walker = PaginationWalker::new(store.clone());
        let records = walker.walk_objects(&query()).await.unwrap();

        let keys: Vec<&str> = records.iter().map(|r| r.key()).collect();
        assert_eq!(
            keys,
            vec!["a.txt", "b.txt", "docs/", "c.txt", "d.txt", "img/"]
        );
        assert_eq!(
            *store.seen_tokens.lock().unwrap(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_walk_objects_propagates_page_failure() {
        let store = Arc::new(ScriptedListing {
            object_pages: vec![
                Ok(ObjectsPage {
                    contents: vec![object("a.txt")],
                    common_prefixes: vec![],
                    is_truncated: true,
                    next_continuation_token: Some("t1".to_string()),
                }),
                Err(UpstreamError::transient("connection reset")),
            ],
            ..Default::default()
        });

        let walker = PaginationWalker::new(store);
        let err = walker.walk_objects(&query()).await.unwrap_err();
        assert_eq!(err, UpstreamError::transient("connection reset"));
    }

    #[tokio::test]
    async fn test_truncated_page_without_token_is_an_error() {
        let store = Arc::new(ScriptedListing {
            object_pages: vec![Ok(ObjectsPage {
                contents: vec![object("a.txt")],
                common_prefixes: vec![],
                is_truncated: true,
                next_continuation_token: None,
            })],
            ..Default::default()
        });

        let walker = PaginationWalker::new(store);
        let err = walker.walk_objects(&query()).await.unwrap_err();
        assert_eq!(err.code(), Some("MissingContinuation"));
    }

    #[tokio::test]
    async fn test_walk_versions_follows_key_marker() {
        let version = |key: &str, id: &str, latest: bool| {
            VersionEntry::Version(VersionRecord {
                key: key.to_string(),
                version_id: Some(id.to_string()),
                is_latest: latest,
                size: 3,
                etag: None,
                last_modified: None,
            })
        };
        let store = Arc::new(ScriptedListing {
            version_pages: vec![
                VersionsPage {
                    entries: vec![
                        VersionEntry::DeleteMarker(DeleteMarkerRecord {
                            key: "a.txt".to_string(),
                            version_id: Some("v3".to_string()),
                            is_latest: true,
                            last_modified: None,
                        }),
                        version("a.txt", "v2", false),
                    ],
                    common_prefixes: vec![],
                    is_truncated: true,
                    next_key_marker: Some("a.txt".to_string()),
                    next_version_id_marker: Some("v2".to_string()),
                },
                VersionsPage {
                    entries: vec![version("a.txt", "v1", false)],
                    common_prefixes: vec![prefix("logs/")],
                    is_truncated: false,
                    next_key_marker: None,
                    next_version_id_marker: None,
                },
            ],
            ..Default::default()
        });

        let walker = PaginationWalker::new(store.clone());
        let records = walker.walk_versions(&query()).await.unwrap();

        assert_eq!(records.len(), 4);
        assert!(matches!(records[0], ListingRecord::DeleteMarker(_)));
        assert!(matches!(records[3], ListingRecord::CommonPrefix(_)));

        let cursors = store.seen_cursors.lock().unwrap();
        assert!(cursors[0].is_start());
        assert_eq!(cursors[1].key_marker.as_deref(), Some("a.txt"));
        assert_eq!(cursors[1].version_id_marker.as_deref(), Some("v2"));
    }
}
