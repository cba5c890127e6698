use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Admin-ops flags arrive as `true`, `1` or `"true"` depending on the gateway
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value != 0,
        Flag::Text(value) => matches!(value.to_ascii_lowercase().as_str(), "true" | "1"),
    })
}

/// Owner reported by `ListBuckets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketOwner {
    pub id: String,
    pub display_name: Option<String>,
}

/// Identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthUser {
    #[serde(rename = "ID")]
    pub id: String,
    pub display_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKey {
    #[serde(default)]
    pub user: String,
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaInfo {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub check_on_raw: bool,
    #[serde(default)]
    pub max_size: i64,
    #[serde(default)]
    pub max_size_kb: i64,
    #[serde(default)]
    pub max_objects: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub size_actual: u64,
    #[serde(default)]
    pub size_utilized: u64,
    #[serde(default)]
    pub size_kb: u64,
    #[serde(default)]
    pub size_kb_actual: u64,
    #[serde(default)]
    pub size_kb_utilized: u64,
    #[serde(default)]
    pub num_objects: u64,
}

/// User record of the gateway's admin-ops API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub max_buckets: i64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub suspended: bool,
    /// Allowed to call the admin-ops API
    #[serde(default, deserialize_with = "lenient_bool")]
    pub admin: bool,
    #[serde(default)]
    pub keys: Vec<UserKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_quota: Option<QuotaInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_quota: Option<QuotaInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStatistics>,
}

/// How a user is looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Uid(String),
    AccessKey(String),
}

impl UserLookup {
    pub fn query_param(&self) -> (&'static str, &str) {
        match self {
            UserLookup::Uid(uid) => ("uid", uid),
            UserLookup::AccessKey(access_key) => ("access-key", access_key),
        }
    }
}

/// User fields to create or modify; unset fields are left to the gateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSpec {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub max_buckets: Option<i64>,
    #[serde(default)]
    pub suspended: Option<bool>,
    #[serde(default)]
    pub admin: Option<bool>,
    #[serde(default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub generate_key: Option<bool>,
}

fn push_text(params: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
        params.push((name, value.to_string()));
    }
}

fn push_value<T: ToString>(params: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<T>) {
    if let Some(value) = value {
        params.push((name, value.to_string()));
    }
}

impl UserSpec {
    /// Admin-ops query parameters; empty strings are left out
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.user_id.is_empty() {
            params.push(("uid", self.user_id.clone()));
        }
        push_text(&mut params, "display-name", &self.display_name);
        push_text(&mut params, "email", &self.email);
        push_value(&mut params, "max-buckets", self.max_buckets);
        push_value(&mut params, "suspended", self.suspended);
        push_value(&mut params, "admin", self.admin);
        push_text(&mut params, "key-type", &self.key_type);
        push_text(&mut params, "access-key", &self.access_key);
        push_text(&mut params, "secret-key", &self.secret_key);
        push_value(&mut params, "generate-key", self.generate_key);
        params
    }
}

/// A key to add to a user; a generated key ignores the given pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKeySpec {
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub generate_key: Option<bool>,
}

impl UserKeySpec {
    pub fn query_params(&self, uid: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("uid", uid.to_string()), ("key-type", "s3".to_string())];
        if self.generate_key == Some(true) {
            params.push(("generate-key", "true".to_string()));
            return params;
        }
        push_text(&mut params, "access-key", &self.access_key);
        push_text(&mut params, "secret-key", &self.secret_key);
        push_value(&mut params, "generate-key", self.generate_key);
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaType {
    User,
    Bucket,
}

impl QuotaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaType::User => "user",
            QuotaType::Bucket => "bucket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuotaSpec {
    #[serde(rename = "type")]
    pub quota_type: QuotaType,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub max_size: Option<i64>,
    #[serde(default)]
    pub max_objects: Option<i64>,
}

impl UserQuotaSpec {
    pub fn query_params(&self, uid: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("uid", uid.to_string()),
            ("quota-type", self.quota_type.as_str().to_string()),
        ];
        push_value(&mut params, "enabled", self.enabled);
        push_value(&mut params, "max-size", self.max_size);
        push_value(&mut params, "max-objects", self.max_objects);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketUsage {
    #[serde(default)]
    pub size_actual: u64,
    #[serde(default)]
    pub num_objects: u64,
}

/// Bucket record of the gateway's admin-ops API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminBucket {
    pub bucket: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub zonegroup: String,
    #[serde(default)]
    pub placement_rule: String,
    #[serde(default)]
    pub num_shards: Option<u64>,
    /// Timestamps are passed through in the gateway's own format
    #[serde(default)]
    pub mtime: String,
    #[serde(default)]
    pub creation_time: String,
    #[serde(default)]
    pub usage: BTreeMap<String, BucketUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_quota: Option<QuotaInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_accepts_numeric_flags() {
        let user: UserInfo = serde_json::from_value(serde_json::json!({
            "user_id": "alice",
            "display_name": "Alice",
            "email": "",
            "suspended": 0,
            "max_buckets": 1000,
            "keys": [{"user": "alice", "access_key": "AK", "secret_key": "SK"}],
            "user_quota": {"enabled": "true", "check_on_raw": false, "max_size": -1,
                           "max_size_kb": 0, "max_objects": -1}
        }))
        .unwrap();

        assert!(!user.suspended);
        assert!(!user.admin);
        assert_eq!(user.keys[0].access_key, "AK");
        assert_eq!(user.user_quota.map(|q| q.enabled), Some(true));
        assert_eq!(user.stats, None);
    }

    #[test]
    fn test_user_spec_params_skip_empty_fields() {
        let spec = UserSpec {
            user_id: "bob".to_string(),
            display_name: Some("Bob".to_string()),
            email: Some(String::new()),
            max_buckets: Some(10),
            suspended: Some(false),
            ..Default::default()
        };
        assert_eq!(
            spec.query_params(),
            vec![
                ("uid", "bob".to_string()),
                ("display-name", "Bob".to_string()),
                ("max-buckets", "10".to_string()),
                ("suspended", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_generated_key_drops_given_pair() {
        let spec = UserKeySpec {
            access_key: Some("AK".to_string()),
            secret_key: Some("SK".to_string()),
            generate_key: Some(true),
        };
        assert_eq!(
            spec.query_params("bob"),
            vec![
                ("uid", "bob".to_string()),
                ("key-type", "s3".to_string()),
                ("generate-key", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_auth_user_json_shape() {
        let json = serde_json::to_value(AuthUser {
            id: "alice".to_string(),
            display_name: "Alice".to_string(),
            is_admin: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"ID": "alice", "DisplayName": "Alice", "IsAdmin": true}));
    }
}
