use axum::Json;
use http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    errors::{MediatorError, UpstreamError, ValidationError},
    models::{LegalHoldStatus, ObjectAttributesUpdate, TagSet},
};

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

pub type ApiResult<T> = Result<T, ApiError>;

/// Query of `PUT /buckets`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBucketQuery {
    pub bucket: String,
    #[serde(default)]
    pub enable_object_locking: bool,
}

/// Query of `PUT /buckets/{bucket}/versioning`
#[derive(Debug, Clone, Deserialize)]
pub struct VersioningQuery {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagSetDto {
    #[serde(default)]
    pub tag_set: TagSet,
}

/// Body of the listing endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListEntriesDto {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub delimiter: Option<String>,
}

/// Addresses one object, optionally at a given version
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectRefDto {
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateObjectDto {
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(flatten)]
    pub update: ObjectAttributesUpdate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectTagsDto {
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub tag_set: TagSet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegalHoldDto {
    pub status: LegalHoldStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectLegalHoldDto {
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    pub legal_hold: LegalHoldDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteByPrefixDto {
    pub prefix: String,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub all_versions: bool,
}

/// Query of the admin user reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStatsQuery {
    #[serde(default)]
    pub with_statistics: bool,
}

/// Query of `DELETE /admin/users/{uid}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteUserQuery {
    #[serde(default)]
    pub purge_data: bool,
}

/// Query of `GET /admin/buckets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminBucketsQuery {
    #[serde(default)]
    pub uid: Option<String>,
}

/// Body of `GET /config`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigResponseDto {
    pub api_path: String,
    pub delimiter: String,
    pub endpoint: Option<String>,
    pub instance_id: String,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponseDto {
    fn new(error: &str, message: String) -> Self {
        ErrorResponseDto {
            error: error.to_string(),
            message,
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn from_mediator_error(error: &MediatorError) -> Self {
        let mut details = HashMap::new();

        if let Some(code) = error.upstream_error().and_then(UpstreamError::code) {
            details.insert(
                "code".to_string(),
                serde_json::Value::String(code.to_string()),
            );
        }

        match error {
            MediatorError::AggregateRead {
                resource,
                sub_resource,
                ..
            } => {
                details.insert(
                    "resource".to_string(),
                    serde_json::Value::String(resource.clone()),
                );
                details.insert(
                    "sub_resource".to_string(),
                    serde_json::Value::String(sub_resource.to_string()),
                );
            }
            MediatorError::BulkDelete { failures } => {
                details.insert(
                    "failed_keys".to_string(),
                    serde_json::Value::Array(
                        error
                            .failed_keys()
                            .into_iter()
                            .map(|key| serde_json::Value::String(key.to_string()))
                            .collect(),
                    ),
                );
                details.insert(
                    "failures".to_string(),
                    serde_json::to_value(failures).unwrap_or(serde_json::Value::Null),
                );
            }
            _ => {}
        }

        let name = match error {
            MediatorError::Upstream(_) => "UpstreamError",
            MediatorError::AggregateRead { .. } => "AggregateReadError",
            MediatorError::BulkDelete { .. } => "BulkDeleteError",
            MediatorError::Validation(_) => "ValidationError",
        };

        ErrorResponseDto {
            details: (!details.is_empty()).then_some(details),
            ..Self::new(name, error.to_string())
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message.to_string())
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new("Unauthorized", message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message.to_string())
    }
}

/// Upstream codes meaning the caller's key pair itself was refused
const REJECTED_CREDENTIAL_CODES: &[&str] = &["InvalidAccessKeyId", "SignatureDoesNotMatch"];

impl From<&MediatorError> for StatusCode {
    fn from(error: &MediatorError) -> Self {
        match error {
            MediatorError::Validation(_) => StatusCode::BAD_REQUEST,
            MediatorError::BulkDelete { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            MediatorError::Upstream(source) | MediatorError::AggregateRead { source, .. } => {
                match source {
                    UpstreamError::NotFound { .. } => StatusCode::NOT_FOUND,
                    UpstreamError::Conflict { .. } | UpstreamError::AlreadyExists { .. } => {
                        StatusCode::CONFLICT
                    }
                    UpstreamError::Transient { .. } => StatusCode::BAD_GATEWAY,
                    UpstreamError::Unknown { code, .. }
                        if REJECTED_CREDENTIAL_CODES.contains(&code.as_str()) =>
                    {
                        StatusCode::UNAUTHORIZED
                    }
                    UpstreamError::Unknown { status, .. } => status
                        .filter(|status| (400..500).contains(status))
                        .and_then(|status| StatusCode::from_u16(status).ok())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                }
            }
        }
    }
}

/// Map a service failure onto its HTTP response
pub fn api_error(error: MediatorError) -> ApiError {
    (
        StatusCode::from(&error),
        Json(ErrorResponseDto::from_mediator_error(&error)),
    )
}

/// Reject a malformed request value
pub fn invalid(what: &str, error: ValidationError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(&format!(
            "Invalid {}: {}",
            what, error
        ))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{errors::SubResourceKind, models::DeleteFailure};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UpstreamError::not_found("b", "NoSuchBucket"), 404),
            (UpstreamError::conflict("b", "BucketNotEmpty", ""), 409),
            (
                UpstreamError::AlreadyExists {
                    resource: "b".to_string(),
                },
                409,
            ),
            (UpstreamError::transient("slow down"), 502),
            (
                UpstreamError::Unknown {
                    code: "AccessDenied".to_string(),
                    message: String::new(),
                    status: Some(403),
                },
                403,
            ),
            (UpstreamError::unknown("Weird", "no status"), 500),
            (
                UpstreamError::Unknown {
                    code: "InvalidAccessKeyId".to_string(),
                    message: String::new(),
                    status: Some(403),
                },
                401,
            ),
        ];

        for (error, expected) in cases {
            let status = StatusCode::from(&MediatorError::Upstream(error.clone()));
            assert_eq!(status.as_u16(), expected, "{:?}", error);
        }

        assert_eq!(
            StatusCode::from(&MediatorError::Validation(ValidationError::EmptyDelimiter)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_bulk_delete_lists_failed_keys() {
        let error = MediatorError::BulkDelete {
            failures: vec![DeleteFailure {
                key: "a/locked.txt".to_string(),
                version_id: None,
                code: "AccessDenied".to_string(),
                message: "Access Denied".to_string(),
            }],
        };

        let (status, Json(body)) = api_error(error);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "BulkDeleteError");
        let details = body.details.unwrap();
        assert_eq!(details["failed_keys"], serde_json::json!(["a/locked.txt"]));
    }

    #[test]
    fn test_aggregate_read_details() {
        let error = MediatorError::AggregateRead {
            resource: "photos".to_string(),
            sub_resource: SubResourceKind::Versioning,
            source: UpstreamError::transient("timeout"),
        };

        let (status, Json(body)) = api_error(error);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let details = body.details.unwrap();
        assert_eq!(details["sub_resource"], "versioning");
        assert_eq!(details["resource"], "photos");
    }

    #[test]
    fn test_update_object_dto_flattens_attributes() {
        let dto: UpdateObjectDto = serde_json::from_value(serde_json::json!({
            "Key": "a.txt",
            "TagSet": [{"Key": "team", "Value": "ops"}],
            "LegalHold": "ON"
        }))
        .unwrap();
        assert_eq!(dto.key, "a.txt");
        assert_eq!(dto.update.legal_hold, Some(LegalHoldStatus::On));
        assert_eq!(dto.update.tag_set.unwrap().get("team"), Some("ops"));
    }
}
