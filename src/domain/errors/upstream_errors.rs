/// Kind of an upstream failure, independent of the wire-level error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    NotFound,
    Conflict,
    AlreadyExists,
    Transient,
    Unknown,
}

/// Errors raised by any call to the upstream object store.
///
/// Upstream error codes are translated into one of these variants at the
/// adapter boundary; code above the ports never matches on raw codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Bucket, object or version does not exist
    NotFound { resource: String, code: String },

    /// The resource is in a state that forbids the request
    Conflict {
        resource: String,
        code: String,
        message: String,
    },

    /// The resource already exists and is owned by someone else
    AlreadyExists { resource: String },

    /// Timeouts, throttling, 5xx and connection failures
    Transient { message: String },

    /// Everything else, with the upstream code and HTTP status when known
    Unknown {
        code: String,
        message: String,
        status: Option<u16>,
    },
}

impl UpstreamError {
    pub fn not_found(resource: impl Into<String>, code: impl Into<String>) -> Self {
        UpstreamError::NotFound {
            resource: resource.into(),
            code: code.into(),
        }
    }

    pub fn conflict(
        resource: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        UpstreamError::Conflict {
            resource: resource.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        UpstreamError::Transient {
            message: message.into(),
        }
    }

    pub fn unknown(code: impl Into<String>, message: impl Into<String>) -> Self {
        UpstreamError::Unknown {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            UpstreamError::NotFound { .. } => UpstreamErrorKind::NotFound,
            UpstreamError::Conflict { .. } => UpstreamErrorKind::Conflict,
            UpstreamError::AlreadyExists { .. } => UpstreamErrorKind::AlreadyExists,
            UpstreamError::Transient { .. } => UpstreamErrorKind::Transient,
            UpstreamError::Unknown { .. } => UpstreamErrorKind::Unknown,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == UpstreamErrorKind::NotFound
    }

    /// The upstream answered and refused the request.
    ///
    /// Sub-resource writes treat a rejection as a failed write and keep going;
    /// transient failures abort the surrounding operation instead.
    pub fn is_rejection(&self) -> bool {
        self.kind() != UpstreamErrorKind::Transient
    }

    /// Wire-level error code reported by the upstream, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            UpstreamError::NotFound { code, .. }
            | UpstreamError::Conflict { code, .. }
            | UpstreamError::Unknown { code, .. } => Some(code),
            UpstreamError::AlreadyExists { .. } => Some("BucketAlreadyExists"),
            UpstreamError::Transient { .. } => None,
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::NotFound { resource, code } => {
                write!(f, "Not found: {} ({})", resource, code)
            }
            UpstreamError::Conflict {
                resource,
                code,
                message,
            } => {
                write!(f, "Conflict on '{}' ({}): {}", resource, code, message)
            }
            UpstreamError::AlreadyExists { resource } => {
                write!(f, "Already exists: {}", resource)
            }
            UpstreamError::Transient { message } => {
                write!(f, "Upstream temporarily unavailable: {}", message)
            }
            UpstreamError::Unknown {
                code,
                message,
                status,
            } => match status {
                Some(status) => write!(f, "Upstream error {} ({}): {}", code, status, message),
                None => write!(f, "Upstream error {}: {}", code, message),
            },
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Result type for upstream store operations
pub type UpstreamResult<T> = Result<T, UpstreamError>;
