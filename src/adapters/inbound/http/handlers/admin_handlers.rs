use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::parse_bucket;
use crate::{
    adapters::inbound::http::{
        dto::{api_error, AdminBucketsQuery, ApiResult, DeleteUserQuery, UserStatsQuery},
        middleware::UpstreamSession,
        router::AppState,
    },
    domain::models::{
        AdminBucket, AuthUser, UserInfo, UserKey, UserKeySpec, UserQuotaSpec, UserSpec,
    },
    ports::services::AdminService,
    services::AdminServiceImpl,
};

fn service(state: &AppState, session: &UpstreamSession) -> AdminServiceImpl {
    AdminServiceImpl::new(
        state.connector.admin_ops(),
        session.store(),
        session.credentials().clone(),
    )
}

pub async fn authenticate(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
) -> ApiResult<Json<AuthUser>> {
    let user = service(&state, &session)
        .authenticate()
        .await
        .map_err(api_error)?;
    Ok(Json(user))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Query(params): Query<UserStatsQuery>,
) -> ApiResult<Json<Vec<UserInfo>>> {
    let users = service(&state, &session)
        .list_users(params.with_statistics)
        .await
        .map_err(api_error)?;
    Ok(Json(users))
}

pub async fn list_user_ids(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
) -> ApiResult<Json<Vec<String>>> {
    let uids = service(&state, &session)
        .list_user_ids()
        .await
        .map_err(api_error)?;
    Ok(Json(uids))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Json(spec): Json<UserSpec>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = service(&state, &session)
        .create_user(spec)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(uid): Path<String>,
    Query(params): Query<UserStatsQuery>,
) -> ApiResult<Json<UserInfo>> {
    let user = service(&state, &session)
        .get_user(&uid, params.with_statistics)
        .await
        .map_err(api_error)?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(uid): Path<String>,
    Json(spec): Json<UserSpec>,
) -> ApiResult<Json<UserInfo>> {
    let user = service(&state, &session)
        .update_user(&uid, spec)
        .await
        .map_err(api_error)?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(uid): Path<String>,
    Query(params): Query<DeleteUserQuery>,
) -> ApiResult<StatusCode> {
    service(&state, &session)
        .delete_user(&uid, params.purge_data)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_user_keys(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(uid): Path<String>,
) -> ApiResult<Json<Vec<UserKey>>> {
    let keys = service(&state, &session)
        .list_keys(&uid)
        .await
        .map_err(api_error)?;
    Ok(Json(keys))
}

pub async fn create_user_key(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(uid): Path<String>,
    Json(spec): Json<UserKeySpec>,
) -> ApiResult<(StatusCode, Json<Vec<UserKey>>)> {
    let keys = service(&state, &session)
        .create_key(&uid, spec)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(keys)))
}

pub async fn delete_user_key(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path((uid, access_key)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    service(&state, &session)
        .delete_key(&uid, &access_key)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_user_quota(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(uid): Path<String>,
    Json(quota): Json<UserQuotaSpec>,
) -> ApiResult<StatusCode> {
    service(&state, &session)
        .set_quota(&uid, quota)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_admin_buckets(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Query(params): Query<AdminBucketsQuery>,
) -> ApiResult<Json<Vec<AdminBucket>>> {
    let buckets = service(&state, &session)
        .list_buckets(params.uid.as_deref())
        .await
        .map_err(api_error)?;
    Ok(Json(buckets))
}

pub async fn get_admin_bucket(
    State(state): State<AppState>,
    Extension(session): Extension<UpstreamSession>,
    Path(bucket): Path<String>,
) -> ApiResult<Json<AdminBucket>> {
    let bucket = parse_bucket(bucket)?;
    let info = service(&state, &session)
        .bucket_info(&bucket)
        .await
        .map_err(api_error)?;
    Ok(Json(info))
}
