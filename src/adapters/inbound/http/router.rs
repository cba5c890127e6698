use axum::{
    middleware,
    routing::{delete, get, head, post, put},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{
    handlers::{
        authenticate, create_bucket, create_user, create_user_key, delete_bucket, delete_by_prefix,
        delete_object, delete_user, delete_user_key, get_admin_bucket, get_bucket_attributes,
        get_bucket_tags, get_config, get_lifecycle, get_object_attributes, get_object_lock,
        get_user, get_versioning, head_bucket, list_admin_buckets, list_buckets, list_entries,
        list_user_ids, list_user_keys, list_users, list_version_entries, object_exists,
        restore_object, set_bucket_tags, set_lifecycle, set_object_legal_hold, set_object_lock,
        set_object_tags, set_user_quota, set_versioning, update_bucket_attributes,
        update_object_attributes, update_user,
    },
    middleware::require_credentials,
};
use crate::{domain::value_objects::Delimiter, ports::storage::UpstreamConnector};

/// Settings the HTTP surface exposes or applies
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub api_path: String,
    pub delimiter: Delimiter,
    pub instance_id: String,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_path: "/api".to_string(),
            delimiter: Delimiter::default(),
            instance_id: String::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn UpstreamConnector>,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(connector: Arc<dyn UpstreamConnector>, settings: ApiSettings) -> Self {
        Self {
            connector,
            settings: Arc::new(settings),
        }
    }
}

/// Routes that act on behalf of a caller and need their credentials
pub fn create_upstream_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Buckets
        .route("/buckets", get(list_buckets).put(create_bucket))
        .route(
            "/buckets/{bucket}",
            head(head_bucket)
                .put(update_bucket_attributes)
                .delete(delete_bucket),
        )
        .route("/buckets/{bucket}/attributes", get(get_bucket_attributes))
        .route(
            "/buckets/{bucket}/versioning",
            get(get_versioning).put(set_versioning),
        )
        .route(
            "/buckets/{bucket}/object-lock",
            get(get_object_lock).put(set_object_lock),
        )
        .route(
            "/buckets/{bucket}/tags",
            get(get_bucket_tags).put(set_bucket_tags),
        )
        .route(
            "/buckets/{bucket}/lifecycle-configuration",
            get(get_lifecycle).put(set_lifecycle),
        )
        // Objects
        .route(
            "/objects/{bucket}",
            post(list_entries).put(update_object_attributes),
        )
        .route("/objects/{bucket}/versions", post(list_version_entries))
        .route("/objects/{bucket}/attributes", post(get_object_attributes))
        .route("/objects/{bucket}/exists", post(object_exists))
        .route("/objects/{bucket}/tags", put(set_object_tags))
        .route("/objects/{bucket}/legal-hold", put(set_object_legal_hold))
        .route("/objects/{bucket}/restore", put(restore_object))
        .route("/objects/{bucket}/delete", delete(delete_object))
        .route("/objects/{bucket}/delete-by-prefix", delete(delete_by_prefix))
        // Identity and administration
        .route("/auth/authenticate", get(authenticate))
        .route("/admin/users", get(list_users).put(create_user))
        .route("/admin/users/ids", get(list_user_ids))
        .route(
            "/admin/users/{uid}",
            get(get_user).post(update_user).delete(delete_user),
        )
        .route(
            "/admin/users/{uid}/keys",
            get(list_user_keys).put(create_user_key),
        )
        .route(
            "/admin/users/{uid}/keys/{access_key}",
            delete(delete_user_key),
        )
        .route("/admin/users/{uid}/quota", put(set_user_quota))
        .route("/admin/buckets", get(list_admin_buckets))
        .route("/admin/buckets/{bucket}", get(get_admin_bucket))
        .route_layer(middleware::from_fn_with_state(state, require_credentials))
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/config", get(get_config))
        .merge(create_upstream_router(state.clone()));

    let api_path = state.settings.api_path.trim_end_matches('/').to_string();
    let router = if api_path.is_empty() {
        api
    } else {
        Router::new().nest(&api_path, api)
    };

    router
        .layer(TimeoutLayer::new(state.settings.request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::storage::MemoryConnector;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;

    fn server(api_path: &str) -> TestServer {
        let state = AppState::new(
            Arc::new(MemoryConnector::default()),
            ApiSettings {
                api_path: api_path.to_string(),
                instance_id: "test-instance".to_string(),
                ..Default::default()
            },
        );
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_config_is_public() {
        let server = server("/api");
        let response = server.get("/api/config").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["ApiPath"], "/api");
        assert_eq!(body["Delimiter"], "/");
        assert_eq!(body["InstanceId"], "test-instance");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_unauthorized() {
        let server = server("/api");
        let response = server.get("/api/buckets").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_credentials_is_unauthorized() {
        let server = server("/api");
        let response = server
            .get("/api/buckets")
            .add_header(
                HeaderName::from_static("x-upstream-credentials"),
                HeaderValue::from_static("no-colon-here"),
            )
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cors_preflight_needs_no_credentials() {
        use axum::{body::Body, http::Request};
        use tower::ServiceExt;

        let state = AppState::new(Arc::new(MemoryConnector::default()), ApiSettings::default());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/buckets")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "GET")
            .header("access-control-request-headers", "x-upstream-credentials")
            .body(Body::empty())
            .unwrap();

        let response = create_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_root_api_path() {
        let server = server("/");
        server.get("/config").await.assert_status_ok();
    }
}
