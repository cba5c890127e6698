use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::{parse_bucket, parse_delimiter, parse_key, parse_version};
use crate::{
    adapters::inbound::http::{
        dto::{
            api_error, ApiResult, DeleteByPrefixDto, ErrorResponseDto, ListEntriesDto,
            ObjectLegalHoldDto, ObjectRefDto, ObjectTagsDto, UpdateObjectDto,
        },
        middleware::UpstreamSession,
        router::AppState,
    },
    domain::models::{DeleteCandidate, DeletedObject, Entry, ObjectAttributes},
    ports::services::ObjectService,
    services::ObjectServiceImpl,
};

fn service(state: &AppState, session: &UpstreamSession) -> ObjectServiceImpl {
    ObjectServiceImpl::with_delimiter(session.store(), state.settings.delimiter.clone())
}

/// Current objects and folders directly below the requested prefix
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ListEntriesDto>,
) -> ApiResult<Json<Vec<Entry>>> {
    let bucket = parse_bucket(bucket)?;
    let delimiter = parse_delimiter(body.delimiter, &state.settings.delimiter)?;
    let entries = service(&state, &session)
        .list_entries(&bucket, body.prefix.as_deref(), &delimiter)
        .await
        .map_err(api_error)?;
    Ok(Json(entries))
}

/// Every version, delete marker and folder directly below the requested prefix
pub async fn list_version_entries(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ListEntriesDto>,
) -> ApiResult<Json<Vec<Entry>>> {
    let bucket = parse_bucket(bucket)?;
    let delimiter = parse_delimiter(body.delimiter, &state.settings.delimiter)?;
    let entries = service(&state, &session)
        .list_version_entries(&bucket, body.prefix.as_deref(), &delimiter)
        .await
        .map_err(api_error)?;
    Ok(Json(entries))
}

pub async fn object_exists(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ObjectRefDto>,
) -> ApiResult<StatusCode> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let exists = service(&state, &session)
        .object_exists(&bucket, &key)
        .await
        .map_err(api_error)?;

    if exists {
        Ok(StatusCode::OK)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponseDto::not_found(&format!(
                "Object '{}' does not exist in '{}'",
                key.as_str(),
                bucket
            ))),
        ))
    }
}

pub async fn get_object_attributes(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ObjectRefDto>,
) -> ApiResult<Json<ObjectAttributes>> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let version_id = parse_version(body.version_id)?;
    let attributes = service(&state, &session)
        .get_attributes(&bucket, &key, version_id.as_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(attributes))
}

pub async fn update_object_attributes(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<UpdateObjectDto>,
) -> ApiResult<Json<ObjectAttributes>> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let version_id = parse_version(body.version_id)?;
    let attributes = service(&state, &session)
        .update_attributes(&bucket, &key, version_id.as_ref(), body.update)
        .await
        .map_err(api_error)?;
    Ok(Json(attributes))
}

pub async fn set_object_tags(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ObjectTagsDto>,
) -> ApiResult<Json<bool>> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let version_id = parse_version(body.version_id)?;
    let applied = service(&state, &session)
        .set_tagging(&bucket, &key, version_id.as_ref(), body.tag_set)
        .await
        .map_err(api_error)?;
    Ok(Json(applied))
}

pub async fn set_object_legal_hold(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ObjectLegalHoldDto>,
) -> ApiResult<Json<bool>> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let version_id = parse_version(body.version_id)?;
    let applied = service(&state, &session)
        .set_legal_hold(&bucket, &key, version_id.as_ref(), body.legal_hold.status)
        .await
        .map_err(api_error)?;
    Ok(Json(applied))
}

/// Make a previous version current again
pub async fn restore_object(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ObjectRefDto>,
) -> ApiResult<StatusCode> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let version_id = parse_version(body.version_id)?;
    service(&state, &session)
        .restore(&bucket, &key, version_id.as_ref())
        .await
        .map_err(api_error)?;
    Ok(StatusCode::OK)
}

pub async fn delete_object(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<ObjectRefDto>,
) -> ApiResult<Json<DeletedObject>> {
    let bucket = parse_bucket(bucket)?;
    let key = parse_key(body.key)?;
    let version_id = parse_version(body.version_id)?;
    let deleted = service(&state, &session)
        .delete_object(&bucket, &key, version_id.as_ref())
        .await
        .map_err(api_error)?;
    Ok(Json(deleted))
}

/// Recursively delete everything below a prefix and list what was removed
pub async fn delete_by_prefix(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
    Json(body): Json<DeleteByPrefixDto>,
) -> ApiResult<Json<Vec<DeleteCandidate>>> {
    let bucket = parse_bucket(bucket)?;
    let delimiter = parse_delimiter(body.delimiter, &state.settings.delimiter)?;
    let deleted = service(&state, &session)
        .delete_by_prefix(&bucket, &body.prefix, &delimiter, body.all_versions)
        .await
        .map_err(api_error)?;
    Ok(Json(deleted))
}
