use aws_sdk_s3::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error as ThisError;

use crate::domain::{
    errors::{UpstreamError, UpstreamResult},
    models::SubResource,
};

#[derive(ThisError, Debug)]
pub enum S3ClientError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Upstream responded {status} ({code}) for '{resource}': {message}")]
    Status {
        status: u16,
        code: String,
        message: String,
        resource: String,
    },
}

impl From<S3ClientError> for UpstreamError {
    fn from(err: S3ClientError) -> Self {
        match err {
            S3ClientError::Status {
                status,
                code,
                message,
                resource,
            } => translate(status, &code, &message, &resource),
            S3ClientError::Transport(source) => {
                if source.is_timeout() || source.is_connect() || source.is_request() {
                    UpstreamError::transient(source.to_string())
                } else {
                    UpstreamError::unknown("TransportError", source.to_string())
                }
            }
            S3ClientError::Signing(message) => UpstreamError::unknown("SigningError", message),
            S3ClientError::InvalidEndpoint(endpoint) => {
                UpstreamError::unknown("InvalidEndpoint", endpoint)
            }
        }
    }
}

/// Error codes that mean an optional sub-resource is simply unset
pub const NOT_CONFIGURED_CODES: &[&str] = &[
    "ObjectLockConfigurationNotFoundError",
    "NoSuchObjectLockConfiguration",
    "NoSuchTagSet",
    "NoSuchLifecycleConfiguration",
];

/// Map an S3 error response onto an upstream error kind
pub fn translate(status: u16, code: &str, message: &str, resource: &str) -> UpstreamError {
    match code {
        "NoSuchBucket" | "NoSuchKey" | "NoSuchVersion" | "NoSuchUpload" | "NoSuchUser" => {
            UpstreamError::not_found(resource, code)
        }
        "BucketAlreadyExists" | "UserAlreadyExists" | "KeyExists" | "EmailExists" => {
            UpstreamError::AlreadyExists {
                resource: resource.to_string(),
            }
        }
        "BucketAlreadyOwnedByYou" | "BucketNotEmpty" | "OperationAborted"
        | "InvalidBucketState" => UpstreamError::conflict(resource, code, message),
        "InternalError" | "ServiceUnavailable" | "SlowDown" | "RequestTimeout" => {
            UpstreamError::transient(format!("{}: {}", code, message))
        }
        _ => match status {
            404 => UpstreamError::not_found(resource, code),
            409 => UpstreamError::conflict(resource, code, message),
            500..=599 => UpstreamError::transient(format!("{} {}: {}", status, code, message)),
            _ => UpstreamError::Unknown {
                code: code.to_string(),
                message: message.to_string(),
                status: Some(status),
            },
        },
    }
}

/// Error code for a response without one, e.g. a failed `HEAD`
pub fn status_code(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .map(|reason| reason.replace(' ', ""))
        .unwrap_or_default()
}

/// Map an SDK failure onto an upstream error kind
pub fn from_sdk<E>(err: SdkError<E>, resource: &str) -> UpstreamError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if matches!(err, SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)) {
        return UpstreamError::transient(DisplayErrorContext(&err).to_string());
    }

    let status = err.raw_response().map(|response| response.status().as_u16());
    match (err.as_service_error(), status) {
        (Some(service), Some(status)) => {
            let code = service
                .code()
                .map(str::to_string)
                .unwrap_or_else(|| status_code(status));
            translate(status, &code, service.message().unwrap_or(""), resource)
        }
        (None, Some(status)) => translate(
            status,
            &status_code(status),
            &DisplayErrorContext(&err).to_string(),
            resource,
        ),
        (_, None) => UpstreamError::unknown("SdkError", DisplayErrorContext(&err).to_string()),
    }
}

/// Read an optional sub-resource, mapping its "unset" codes to `NotConfigured`
pub fn sub_resource<T, E>(
    result: Result<T, SdkError<E>>,
    also_unset: &[&str],
    resource: &str,
) -> UpstreamResult<SubResource<T>>
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(output) => Ok(SubResource::Configured(output)),
        Err(err) => {
            let unset = err.as_service_error().and_then(|e| e.code()).is_some_and(|code| {
                NOT_CONFIGURED_CODES.contains(&code) || also_unset.contains(&code)
            });
            if unset {
                Ok(SubResource::NotConfigured)
            } else {
                Err(from_sdk(err, resource))
            }
        }
    }
}

/// A request document the SDK refused to build
pub fn build_error(err: BuildError) -> UpstreamError {
    UpstreamError::unknown("InvalidRequest", err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::UpstreamErrorKind;

    #[test]
    fn test_translate_codes() {
        let cases = [
            (404, "NoSuchBucket", UpstreamErrorKind::NotFound),
            (404, "NoSuchVersion", UpstreamErrorKind::NotFound),
            (409, "BucketAlreadyExists", UpstreamErrorKind::AlreadyExists),
            (409, "UserAlreadyExists", UpstreamErrorKind::AlreadyExists),
            (404, "NoSuchUser", UpstreamErrorKind::NotFound),
            (403, "InvalidAccessKeyId", UpstreamErrorKind::Unknown),
            (409, "BucketAlreadyOwnedByYou", UpstreamErrorKind::Conflict),
            (409, "BucketNotEmpty", UpstreamErrorKind::Conflict),
            (409, "InvalidBucketState", UpstreamErrorKind::Conflict),
            (503, "SlowDown", UpstreamErrorKind::Transient),
            (500, "InternalError", UpstreamErrorKind::Transient),
            (403, "AccessDenied", UpstreamErrorKind::Unknown),
            (400, "InvalidRequest", UpstreamErrorKind::Unknown),
        ];

        for (status, code, expected) in cases {
            assert_eq!(
                translate(status, code, "message", "bucket").kind(),
                expected,
                "code {}",
                code
            );
        }
    }

    #[test]
    fn test_translate_falls_back_to_status() {
        assert!(translate(404, "", "", "b/k").is_not_found());
        assert_eq!(
            translate(502, "BadGateway", "", "b").kind(),
            UpstreamErrorKind::Transient
        );
        assert_eq!(
            translate(409, "Whatever", "", "b").kind(),
            UpstreamErrorKind::Conflict
        );
    }

    #[test]
    fn test_unknown_keeps_code_and_status() {
        let err = translate(403, "AccessDenied", "denied", "b");
        assert_eq!(
            err,
            UpstreamError::Unknown {
                code: "AccessDenied".to_string(),
                message: "denied".to_string(),
                status: Some(403),
            }
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_status_code_names() {
        assert_eq!(status_code(403), "Forbidden");
        assert_eq!(status_code(404), "NotFound");
        assert_eq!(status_code(599), "");
    }

    #[test]
    fn test_admin_status_error_translates() {
        let err: UpstreamError = S3ClientError::Status {
            status: 404,
            code: "NoSuchUser".to_string(),
            message: String::new(),
            resource: "alice".to_string(),
        }
        .into();
        assert!(err.is_not_found());
    }
}
