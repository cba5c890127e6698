pub mod admin_handlers;
pub mod bucket_handlers;
pub mod config_handlers;
pub mod object_handlers;

pub use admin_handlers::*;
pub use bucket_handlers::*;
pub use config_handlers::*;
pub use object_handlers::*;

use crate::{
    adapters::inbound::http::dto::{invalid, ApiResult},
    domain::value_objects::{BucketName, Delimiter, ObjectKey, VersionId},
};

pub(crate) fn parse_bucket(bucket: String) -> ApiResult<BucketName> {
    BucketName::new(bucket).map_err(|e| invalid("bucket name", e))
}

pub(crate) fn parse_key(key: String) -> ApiResult<ObjectKey> {
    ObjectKey::new(key).map_err(|e| invalid("object key", e))
}

pub(crate) fn parse_version(version_id: Option<String>) -> ApiResult<Option<VersionId>> {
    version_id
        .filter(|v| !v.is_empty())
        .map(VersionId::new)
        .transpose()
        .map_err(|e| invalid("version id", e))
}

/// Request delimiter, or the configured one when absent
pub(crate) fn parse_delimiter(
    delimiter: Option<String>,
    default: &Delimiter,
) -> ApiResult<Delimiter> {
    match delimiter {
        Some(delimiter) => Delimiter::new(delimiter).map_err(|e| invalid("delimiter", e)),
        None => Ok(default.clone()),
    }
}
