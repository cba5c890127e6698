use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{MediatorError, MediatorResult},
        models::{
            DeleteCandidate, DeleteFailure, ListingQuery, ListingRecord, PrefixDeletionPlan,
        },
        value_objects::{BucketName, Delimiter},
    },
    ports::storage::{ListingStore, ObjectStore},
    services::pagination::PaginationWalker,
};

/// Most identifiers a single `DeleteObjects` call accepts
pub const MAX_BATCH_SIZE: usize = 1000;

/// Deletes every object below a prefix, descending into virtual folders.
pub struct PrefixDeleter<S: ListingStore + ObjectStore + ?Sized> {
    store: Arc<S>,
    walker: PaginationWalker<S>,
}

impl<S: ListingStore + ObjectStore + ?Sized> PrefixDeleter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            walker: PaginationWalker::new(store.clone()),
            store,
        }
    }

    /// Collect the candidates below `prefix` without deleting anything
    pub async fn plan(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &Delimiter,
        all_versions: bool,
    ) -> MediatorResult<PrefixDeletionPlan> {
        let candidates = self
            .collect(bucket, prefix.to_string(), delimiter, all_versions)
            .await?;

        debug!(
            bucket = %bucket,
            prefix = %prefix,
            candidates = candidates.len(),
            "planned prefix deletion"
        );

        Ok(PrefixDeletionPlan {
            bucket: bucket.as_str().to_string(),
            prefix: prefix.to_string(),
            all_versions,
            candidates,
        })
    }

    /// Delete everything below `prefix`, returning what was submitted
    pub async fn delete_by_prefix(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &Delimiter,
        all_versions: bool,
    ) -> MediatorResult<Vec<DeleteCandidate>> {
        let plan = self.plan(bucket, prefix, delimiter, all_versions).await?;
        if plan.is_empty() {
            info!(bucket = %bucket, prefix = %prefix, "nothing to delete below prefix");
            return Ok(Vec::new());
        }

        let mut failures: Vec<DeleteFailure> = Vec::new();
        for batch in plan.candidates.chunks(MAX_BATCH_SIZE) {
            let outcome = self.store.delete_objects(bucket, batch).await?;
            debug!(
                bucket = %bucket,
                submitted = batch.len(),
                deleted = outcome.deleted.len(),
                failed = outcome.errors.len(),
                "bulk delete batch finished"
            );
            failures.extend(outcome.errors);
        }

        if !failures.is_empty() {
            warn!(
                bucket = %bucket,
                prefix = %prefix,
                failed = failures.len(),
                "prefix deletion left objects behind"
            );
            return Err(MediatorError::BulkDelete { failures });
        }

        info!(
            bucket = %bucket,
            prefix = %prefix,
            deleted = plan.candidates.len(),
            all_versions,
            "deleted objects below prefix"
        );
        Ok(plan.candidates)
    }

    /// One recursion level, descending into each common prefix as listed
    fn collect<'a>(
        &'a self,
        bucket: &'a BucketName,
        prefix: String,
        delimiter: &'a Delimiter,
        all_versions: bool,
    ) -> BoxFuture<'a, MediatorResult<Vec<DeleteCandidate>>> {
        async move {
            let query = ListingQuery::builder()
                .bucket(bucket.as_str())
                .maybe_prefix((!prefix.is_empty()).then(|| prefix.clone()))
                .delimiter(delimiter.as_str())
                .build();

            let records = match self.walker.walk_versions(&query).await {
                Ok(records) => records,
                Err(err) if err.is_not_found() => {
                    debug!(bucket = %bucket, prefix = %prefix, "prefix not found, nothing to collect");
                    return Ok(Vec::new());
                }
                Err(err) => return Err(err.into()),
            };

            let mut folders_seen = HashSet::new();
            let mut candidates = Vec::new();

            for record in records {
                match record {
                    ListingRecord::CommonPrefix(common) => {
                        if common.prefix == prefix {
                            warn!(bucket = %bucket, prefix = %prefix, "folder repeats its parent prefix, skipping");
                            continue;
                        }
                        if !folders_seen.insert(common.prefix.clone()) {
                            continue;
                        }
                        let nested = self
                            .collect(bucket, common.prefix, delimiter, all_versions)
                            .await?;
                        candidates.extend(nested);
                    }
                    record => candidates.extend(candidate_for(record, all_versions)),
                }
            }

            Ok(candidates)
        }
        .boxed()
    }
}

/// Raw listing keys are kept so that empty segments survive
fn candidate_for(record: ListingRecord, all_versions: bool) -> Option<DeleteCandidate> {
    match record {
        ListingRecord::Object(object) => Some(DeleteCandidate::current(object.key)),
        ListingRecord::Version(version) if all_versions => Some(DeleteCandidate {
            key: version.key,
            version_id: version.version_id,
        }),
        ListingRecord::Version(version) => version
            .is_latest
            .then(|| DeleteCandidate::current(version.key)),
        ListingRecord::DeleteMarker(marker) => all_versions.then(|| DeleteCandidate {
            key: marker.key,
            version_id: marker.version_id,
        }),
        ListingRecord::CommonPrefix(_) => None,
    }
}
