use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum_test::{TestRequest, TestServer};
use object_store_mediator::{
    adapters::outbound::storage::{InMemoryStore, MemoryConnector},
    domain::models::{UserInfo, UserKey},
    AppBuilder, BucketName, ObjectKey,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    server: TestServer,
    store: InMemoryStore,
}

impl Harness {
    fn new() -> Self {
        let store = InMemoryStore::with_page_size(3);
        let app = AppBuilder::new()
            .with_connector(Arc::new(MemoryConnector::new(store.clone())))
            .build()
            .unwrap();
        let server = TestServer::new(app.router()).unwrap();
        Self { server, store }
    }

    fn authorized(&self, request: TestRequest) -> TestRequest {
        request.add_header(
            HeaderName::from_static("x-upstream-credentials"),
            HeaderValue::from_static("minioadmin:minioadmin"),
        )
    }

    fn get(&self, path: &str) -> TestRequest {
        self.authorized(self.server.get(path))
    }

    fn post(&self, path: &str) -> TestRequest {
        self.authorized(self.server.post(path))
    }

    fn put(&self, path: &str) -> TestRequest {
        self.authorized(self.server.put(path))
    }

    fn delete(&self, path: &str) -> TestRequest {
        self.authorized(self.server.delete(path))
    }

    async fn put_object(&self, bucket: &str, key: &str, data: &str) -> String {
        self.store
            .put_object(
                &BucketName::new(bucket.to_string()).unwrap(),
                &ObjectKey::new(key.to_string()).unwrap(),
                data.as_bytes().to_vec(),
                Some("text/plain"),
            )
            .await
            .unwrap()
    }

    /// Make the harness credentials belong to an admin-ops user
    async fn register_admin(&self) {
        self.store
            .add_user(UserInfo {
                user_id: "admin".to_string(),
                display_name: "Administrator".to_string(),
                email: String::new(),
                max_buckets: 1000,
                suspended: false,
                admin: true,
                keys: vec![UserKey {
                    user: "admin".to_string(),
                    access_key: "minioadmin".to_string(),
                    secret_key: "minioadmin".to_string(),
                }],
                bucket_quota: None,
                user_quota: None,
                stats: None,
            })
            .await;
    }

    async fn create_bucket(&self, bucket: &str, object_lock: bool) {
        self.put("/api/buckets")
            .add_query_param("bucket", bucket)
            .add_query_param("enable_object_locking", object_lock)
            .await
            .assert_status(StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_bucket_lifecycle_over_http() {
    let h = Harness::new();

    h.create_bucket("photos", false).await;

    let buckets: Value = h.get("/api/buckets").await.json();
    assert_eq!(buckets[0]["Name"], "photos");

    h.authorized(h.server.method(Method::HEAD, "/api/buckets/photos"))
        .await
        .assert_status_ok();
    h.authorized(h.server.method(Method::HEAD, "/api/buckets/missing"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Creating it again is a conflict
    h.put("/api/buckets")
        .add_query_param("bucket", "photos")
        .await
        .assert_status(StatusCode::CONFLICT);

    h.delete("/api/buckets/photos")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let buckets: Value = h.get("/api/buckets").await.json();
    assert_eq!(buckets, json!([]));
}

#[tokio::test]
async fn test_invalid_bucket_name_is_bad_request() {
    let h = Harness::new();

    let response = h
        .put("/api/buckets")
        .add_query_param("bucket", "Not_A_Bucket")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "BadRequest");
}

#[tokio::test]
async fn test_delete_non_empty_bucket_is_conflict() {
    let h = Harness::new();
    h.create_bucket("photos", false).await;
    h.put_object("photos", "a.jpg", "jpeg").await;

    let response = h.delete("/api/buckets/photos").await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "UpstreamError");
    assert_eq!(body["details"]["code"], "BucketNotEmpty");
}

#[tokio::test]
async fn test_bucket_attributes_round_trip() {
    let h = Harness::new();
    h.create_bucket("photos", false).await;

    let attributes: Value = h.get("/api/buckets/photos/attributes").await.json();
    assert_eq!(attributes["Name"], "photos");
    assert_eq!(attributes["VersioningEnabled"], false);
    assert_eq!(attributes["ObjectLockEnabled"], false);
    assert_eq!(attributes["TagSet"], json!([]));

    let updated: Value = h
        .put("/api/buckets/photos")
        .json(&json!({
            "Name": "photos",
            "VersioningEnabled": true,
            "TagSet": [{"Key": "team", "Value": "ops"}]
        }))
        .await
        .json();
    assert_eq!(updated["VersioningEnabled"], true);
    assert_eq!(updated["TagSet"][0]["Key"], "team");

    let versioning: Value = h.get("/api/buckets/photos/versioning").await.json();
    assert_eq!(versioning, json!(true));

    let tags: Value = h.get("/api/buckets/photos/tags").await.json();
    assert_eq!(tags, json!([{"Key": "team", "Value": "ops"}]));
}

#[tokio::test]
async fn test_object_lock_endpoints() {
    let h = Harness::new();
    h.create_bucket("vault", true).await;
    h.create_bucket("plain", false).await;

    let lock: Value = h.get("/api/buckets/plain/object-lock").await.json();
    assert_eq!(lock["ObjectLockEnabled"], false);

    let applied: Value = h
        .put("/api/buckets/vault/object-lock")
        .json(&json!({
            "ObjectLockEnabled": true,
            "RetentionEnabled": true,
            "RetentionMode": "GOVERNANCE",
            "RetentionValidity": 7,
            "RetentionUnit": "Days"
        }))
        .await
        .json();
    assert_eq!(applied["RetentionValidity"], 7);
    assert_eq!(applied["RetentionUnit"], "Days");

    let lock: Value = h.get("/api/buckets/vault/object-lock").await.json();
    assert_eq!(lock["ObjectLockEnabled"], true);
    assert_eq!(lock["RetentionMode"], "GOVERNANCE");

    let incomplete = h
        .put("/api/buckets/vault/object-lock")
        .json(&json!({
            "ObjectLockEnabled": true,
            "RetentionEnabled": true,
            "RetentionMode": "GOVERNANCE"
        }))
        .await;
    incomplete.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = incomplete.json();
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn test_lifecycle_configuration_endpoints() {
    let h = Harness::new();
    h.create_bucket("logs", false).await;

    let empty: Value = h
        .get("/api/buckets/logs/lifecycle-configuration")
        .await
        .json();
    assert_eq!(empty["Rules"], json!([]));

    let applied: Value = h
        .put("/api/buckets/logs/lifecycle-configuration")
        .json(&json!({
            "Rules": [{
                "ID": "expire-tmp",
                "Status": "Enabled",
                "Filter": {"Prefix": "tmp/"},
                "Expiration": {"Days": 1}
            }]
        }))
        .await
        .json();
    assert_eq!(applied, json!(true));

    let config: Value = h
        .get("/api/buckets/logs/lifecycle-configuration")
        .await
        .json();
    assert_eq!(config["Rules"][0]["ID"], "expire-tmp");
}

#[tokio::test]
async fn test_listing_over_http() {
    let h = Harness::new();
    h.create_bucket("docs", false).await;
    for key in ["a/1.txt", "a/2.txt", "a/b/3.txt", "c.txt", "d.txt", "e.txt"] {
        h.put_object("docs", key, key).await;
    }

    let top: Value = h.post("/api/objects/docs").json(&json!({})).await.json();
    let keys: Vec<&str> = top
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["Key"].as_str().unwrap())
        .collect();
    // Folders follow the objects of the page they were listed on
    assert_eq!(keys, vec!["c.txt", "d.txt", "a", "e.txt"]);
    assert_eq!(top[2]["Type"], "FOLDER");
    assert_eq!(top[0]["Type"], "OBJECT");

    let nested: Value = h
        .post("/api/objects/docs")
        .json(&json!({"Prefix": "a/"}))
        .await
        .json();
    let names: Vec<&str> = nested
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["1.txt", "2.txt", "b"]);
}

#[tokio::test]
async fn test_object_endpoints() {
    let h = Harness::new();
    h.create_bucket("docs", false).await;
    h.put_object("docs", "reports/q1.txt", "numbers").await;

    h.post("/api/objects/docs/exists")
        .json(&json!({"Key": "reports/q1.txt"}))
        .await
        .assert_status_ok();
    h.post("/api/objects/docs/exists")
        .json(&json!({"Key": "reports/q2.txt"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let attributes: Value = h
        .post("/api/objects/docs/attributes")
        .json(&json!({"Key": "reports/q1.txt"}))
        .await
        .json();
    assert_eq!(attributes["Name"], "q1.txt");
    assert_eq!(attributes["Size"], 7);
    assert_eq!(attributes["ContentType"], "text/plain");

    let tagged: Value = h
        .put("/api/objects/docs/tags")
        .json(&json!({
            "Key": "reports/q1.txt",
            "TagSet": [{"Key": "quarter", "Value": "q1"}]
        }))
        .await
        .json();
    assert_eq!(tagged, json!(true));

    let updated: Value = h
        .put("/api/objects/docs")
        .json(&json!({
            "Key": "reports/q1.txt",
            "TagSet": [{"Key": "quarter", "Value": "q1"}]
        }))
        .await
        .json();
    assert_eq!(updated["TagSet"][0]["Value"], "q1");

    // No object lock on this bucket, so the hold is refused
    let held: Value = h
        .put("/api/objects/docs/legal-hold")
        .json(&json!({"Key": "reports/q1.txt", "LegalHold": {"Status": "ON"}}))
        .await
        .json();
    assert_eq!(held, json!(false));

    let deleted: Value = h
        .delete("/api/objects/docs/delete")
        .json(&json!({"Key": "reports/q1.txt"}))
        .await
        .json();
    assert_eq!(deleted["Key"], "reports/q1.txt");

    h.post("/api/objects/docs/attributes")
        .json(&json!({"Key": "reports/q1.txt"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_versions_and_restore_over_http() {
    let h = Harness::new();
    h.create_bucket("docs", false).await;
    h.put("/api/buckets/docs/versioning")
        .add_query_param("enabled", true)
        .await
        .assert_status_ok();

    let first = h.put_object("docs", "notes.txt", "first").await;
    h.put_object("docs", "notes.txt", "second version").await;

    let versions: Value = h
        .post("/api/objects/docs/versions")
        .json(&json!({}))
        .await
        .json();
    assert_eq!(versions.as_array().unwrap().len(), 2);
    assert_eq!(versions[0]["IsLatest"], true);
    assert_eq!(versions[1]["VersionId"], first.as_str());

    h.put("/api/objects/docs/restore")
        .json(&json!({"Key": "notes.txt", "VersionId": first}))
        .await
        .assert_status_ok();

    let attributes: Value = h
        .post("/api/objects/docs/attributes")
        .json(&json!({"Key": "notes.txt"}))
        .await
        .json();
    assert_eq!(attributes["Size"], 5);

    let versions: Value = h
        .post("/api/objects/docs/versions")
        .json(&json!({}))
        .await
        .json();
    assert_eq!(versions.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_delete_by_prefix_over_http() {
    let h = Harness::new();
    h.create_bucket("docs", false).await;
    for key in ["tmp/a", "tmp/b/c", "tmp/b/d/e", "keep/f"] {
        h.put_object("docs", key, "x").await;
    }

    let deleted: Value = h
        .delete("/api/objects/docs/delete-by-prefix")
        .json(&json!({"Prefix": "tmp/"}))
        .await
        .json();
    assert_eq!(deleted.as_array().unwrap().len(), 3);

    let top: Value = h.post("/api/objects/docs").json(&json!({})).await.json();
    assert_eq!(top.as_array().unwrap().len(), 1);
    assert_eq!(top[0]["Key"], "keep");
}

#[tokio::test]
async fn test_bulk_delete_failure_over_http() {
    let h = Harness::new();
    h.create_bucket("docs", false).await;
    h.put_object("docs", "tmp/a", "x").await;
    h.put_object("docs", "tmp/held", "x").await;
    h.store.deny_deletion("tmp/held").await;

    let response = h
        .delete("/api/objects/docs/delete-by-prefix")
        .json(&json!({"Prefix": "tmp/"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "BulkDeleteError");
    assert_eq!(body["details"]["failed_keys"], json!(["tmp/held"]));
}

#[tokio::test]
async fn test_config_reports_delimiter_without_credentials() {
    let h = Harness::new();

    let config: Value = h.server.get("/api/config").await.json();
    assert_eq!(config["ApiPath"], "/api");
    assert_eq!(config["Delimiter"], "/");
    assert_eq!(config["Endpoint"], Value::Null);

    h.server
        .post("/api/objects/docs")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticate_over_http() {
    let h = Harness::new();
    h.store.set_owner("owner-id", Some("Owner")).await;

    let identity: Value = h.get("/api/auth/authenticate").await.json();
    assert_eq!(
        identity,
        json!({"ID": "owner-id", "DisplayName": "Owner", "IsAdmin": false})
    );

    h.register_admin().await;
    let identity: Value = h.get("/api/auth/authenticate").await.json();
    assert_eq!(
        identity,
        json!({"ID": "admin", "DisplayName": "Administrator", "IsAdmin": true})
    );

    h.server
        .get("/api/auth/authenticate")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_users_over_http() {
    let h = Harness::new();
    h.register_admin().await;

    let response = h
        .put("/api/admin/users")
        .json(&json!({"user_id": "bob", "display_name": "Bob"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["user_id"], "bob");
    assert_eq!(created["keys"].as_array().unwrap().len(), 1);

    h.put("/api/admin/users")
        .json(&json!({"user_id": "bob", "display_name": "Bob"}))
        .await
        .assert_status(StatusCode::CONFLICT);
    h.put("/api/admin/users")
        .json(&json!({"user_id": "carol"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let ids: Value = h.get("/api/admin/users/ids").await.json();
    assert_eq!(ids, json!(["admin", "bob"]));

    let updated: Value = h
        .post("/api/admin/users/bob")
        .json(&json!({"max_buckets": 5}))
        .await
        .json();
    assert_eq!(updated["max_buckets"], 5);

    let keys: Value = h
        .put("/api/admin/users/bob/keys")
        .json(&json!({"access_key": "BOBKEY", "secret_key": "BOBSECRET", "generate_key": false}))
        .await
        .json();
    assert_eq!(keys.as_array().unwrap().len(), 2);

    h.delete("/api/admin/users/bob/keys/BOBKEY")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let keys: Value = h.get("/api/admin/users/bob/keys").await.json();
    assert_eq!(keys.as_array().unwrap().len(), 1);

    h.put("/api/admin/users/bob/quota")
        .json(&json!({"type": "user", "enabled": true, "max_objects": 100}))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let bob: Value = h.get("/api/admin/users/bob").await.json();
    assert_eq!(bob["user_quota"]["max_objects"], 100);

    h.delete("/api/admin/users/bob")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    h.get("/api/admin/users/bob")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_reject_unknown_keys() {
    let h = Harness::new();

    let response = h.get("/api/admin/users").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["details"]["code"], "InvalidAccessKeyId");
}

#[tokio::test]
async fn test_admin_buckets_over_http() {
    let h = Harness::new();
    h.register_admin().await;
    h.create_bucket("docs", false).await;
    h.put_object("docs", "a.txt", "hello").await;

    let buckets: Value = h.get("/api/admin/buckets").await.json();
    assert_eq!(buckets[0]["bucket"], "docs");
    assert_eq!(buckets[0]["usage"]["rgw.main"]["num_objects"], 1);
    assert_eq!(buckets[0]["usage"]["rgw.main"]["size_actual"], 5);

    let info: Value = h.get("/api/admin/buckets/docs").await.json();
    assert_eq!(info["owner"], "local");
    h.get("/api/admin/buckets/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
