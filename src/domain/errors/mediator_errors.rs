use crate::domain::{
    errors::{UpstreamError, UpstreamErrorKind, ValidationError},
    models::DeleteFailure,
};

/// Sub-resource read while assembling an aggregate record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubResourceKind {
    Identity,
    Versioning,
    ObjectLock,
    Tagging,
    ObjectHead,
    ObjectTagging,
    LegalHold,
}

impl std::fmt::Display for SubResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubResourceKind::Identity => "identity",
            SubResourceKind::Versioning => "versioning",
            SubResourceKind::ObjectLock => "object lock configuration",
            SubResourceKind::Tagging => "tagging",
            SubResourceKind::ObjectHead => "object metadata",
            SubResourceKind::ObjectTagging => "object tagging",
            SubResourceKind::LegalHold => "legal hold",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the mediator services
#[derive(Debug, Clone)]
pub enum MediatorError {
    /// A single upstream call failed
    Upstream(UpstreamError),

    /// One of the concurrent reads behind an aggregate record failed
    AggregateRead {
        resource: String,
        sub_resource: SubResourceKind,
        source: UpstreamError,
    },

    /// The bulk delete reported per-item failures
    BulkDelete { failures: Vec<DeleteFailure> },

    /// The request itself is malformed
    Validation(ValidationError),
}

impl MediatorError {
    /// Upstream error kind behind this failure, if it came from upstream
    pub fn upstream_kind(&self) -> Option<UpstreamErrorKind> {
        self.upstream_error().map(UpstreamError::kind)
    }

    pub fn upstream_error(&self) -> Option<&UpstreamError> {
        match self {
            MediatorError::Upstream(source) | MediatorError::AggregateRead { source, .. } => {
                Some(source)
            }
            MediatorError::BulkDelete { .. } | MediatorError::Validation(_) => None,
        }
    }

    pub fn failed_keys(&self) -> Vec<&str> {
        match self {
            MediatorError::BulkDelete { failures } => {
                failures.iter().map(|f| f.key.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for MediatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediatorError::Upstream(source) => write!(f, "{}", source),
            MediatorError::AggregateRead {
                resource,
                sub_resource,
                source,
            } => {
                write!(
                    f,
                    "Unable to obtain {} of '{}': {}",
                    sub_resource, resource, source
                )
            }
            MediatorError::BulkDelete { failures } => {
                let keys: Vec<&str> = failures.iter().map(|f| f.key.as_str()).collect();
                write!(
                    f,
                    "Failed to delete {} object(s): {}",
                    failures.len(),
                    keys.join(", ")
                )
            }
            MediatorError::Validation(err) => write!(f, "Validation error: {}", err),
        }
    }
}

impl std::error::Error for MediatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MediatorError::Upstream(source) | MediatorError::AggregateRead { source, .. } => {
                Some(source)
            }
            MediatorError::Validation(err) => Some(err),
            MediatorError::BulkDelete { .. } => None,
        }
    }
}

impl From<UpstreamError> for MediatorError {
    fn from(err: UpstreamError) -> Self {
        MediatorError::Upstream(err)
    }
}

impl From<ValidationError> for MediatorError {
    fn from(err: ValidationError) -> Self {
        MediatorError::Validation(err)
    }
}

/// Result type for mediator service operations
pub type MediatorResult<T> = Result<T, MediatorError>;
