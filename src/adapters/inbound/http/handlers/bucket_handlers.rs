use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};

use super::parse_bucket;
use crate::{
    adapters::inbound::http::{
        dto::{api_error, ApiResult, CreateBucketQuery, ErrorResponseDto, TagSetDto, VersioningQuery},
        middleware::UpstreamSession,
    },
    domain::models::{
        AggregateAttributes, BucketSummary, LifecycleConfiguration, ObjectLockSettings, TagSet,
    },
    ports::services::BucketService,
    services::BucketServiceImpl,
};

fn service(session: &UpstreamSession) -> BucketServiceImpl {
    BucketServiceImpl::new(session.store())
}

pub async fn list_buckets(
    Extension(session): Extension<UpstreamSession>,
) -> ApiResult<Json<Vec<BucketSummary>>> {
    let buckets = service(&session).list_buckets().await.map_err(api_error)?;
    Ok(Json(buckets))
}

pub async fn create_bucket(
    Extension(session): Extension<UpstreamSession>,
    Query(params): Query<CreateBucketQuery>,
) -> ApiResult<StatusCode> {
    let bucket = parse_bucket(params.bucket)?;
    service(&session)
        .create_bucket(&bucket, params.enable_object_locking)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::CREATED)
}

pub async fn head_bucket(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<StatusCode> {
    let bucket = parse_bucket(bucket)?;
    let exists = service(&session)
        .bucket_exists(&bucket)
        .await
        .map_err(api_error)?;

    if exists {
        Ok(StatusCode::OK)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponseDto::not_found(&format!(
                "Bucket '{}' does not exist",
                bucket
            ))),
        ))
    }
}

pub async fn delete_bucket(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<StatusCode> {
    let bucket = parse_bucket(bucket)?;
    service(&session)
        .delete_bucket(&bucket)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_bucket_attributes(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<Json<AggregateAttributes>> {
    let bucket = parse_bucket(bucket)?;
    let attributes = service(&session)
        .get_attributes(&bucket)
        .await
        .map_err(api_error)?;
    Ok(Json(attributes))
}

/// Reconcile the bucket towards the posted record and return what took effect
pub async fn update_bucket_attributes(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(requested): Json<AggregateAttributes>,
) -> ApiResult<Json<AggregateAttributes>> {
    let bucket = parse_bucket(bucket)?;
    let attributes = service(&session)
        .update_attributes(&bucket, requested)
        .await
        .map_err(api_error)?;
    Ok(Json(attributes))
}

pub async fn get_versioning(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<Json<bool>> {
    let bucket = parse_bucket(bucket)?;
    let enabled = service(&session)
        .get_versioning(&bucket)
        .await
        .map_err(api_error)?;
    Ok(Json(enabled))
}

pub async fn set_versioning(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Query(params): Query<VersioningQuery>,
) -> ApiResult<Json<bool>> {
    let bucket = parse_bucket(bucket)?;
    let applied = service(&session)
        .set_versioning(&bucket, params.enabled)
        .await
        .map_err(api_error)?;
    Ok(Json(applied))
}

pub async fn get_object_lock(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<Json<ObjectLockSettings>> {
    let bucket = parse_bucket(bucket)?;
    let settings = service(&session)
        .get_object_lock(&bucket)
        .await
        .map_err(api_error)?;
    Ok(Json(settings))
}

pub async fn set_object_lock(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(settings): Json<ObjectLockSettings>,
) -> ApiResult<Json<ObjectLockSettings>> {
    let bucket = parse_bucket(bucket)?;
    let settings = service(&session)
        .set_object_lock(&bucket, settings)
        .await
        .map_err(api_error)?;
    Ok(Json(settings))
}

pub async fn get_bucket_tags(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<Json<TagSet>> {
    let bucket = parse_bucket(bucket)?;
    let tags = service(&session)
        .get_tagging(&bucket)
        .await
        .map_err(api_error)?;
    Ok(Json(tags))
}

pub async fn set_bucket_tags(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<TagSetDto>,
) -> ApiResult<Json<bool>> {
    let bucket = parse_bucket(bucket)?;
    let applied = service(&session)
        .set_tagging(&bucket, body.tag_set)
        .await
        .map_err(api_error)?;
    Ok(Json(applied))
}

pub async fn get_lifecycle(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<Json<LifecycleConfiguration>> {
    let bucket = parse_bucket(bucket)?;
    let config = service(&session)
        .get_lifecycle(&bucket)
        .await
        .map_err(api_error)?;
    Ok(Json(config))
}

pub async fn set_lifecycle(
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(config): Json<LifecycleConfiguration>,
) -> ApiResult<Json<bool>> {
    let bucket = parse_bucket(bucket)?;
    let applied = service(&session)
        .set_lifecycle(&bucket, config)
        .await
        .map_err(api_error)?;
    Ok(Json(applied))
}
