use serde::{Deserialize, Serialize};

/// One object (version) scheduled for deletion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteCandidate {
    pub key: String,
    /// `None` targets the current version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl DeleteCandidate {
    pub fn current(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
        }
    }

    pub fn version(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
        }
    }
}

/// Everything a prefix deletion would remove, in listing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrefixDeletionPlan {
    pub bucket: String,
    pub prefix: String,
    pub all_versions: bool,
    pub candidates: Vec<DeleteCandidate>,
}

impl PrefixDeletionPlan {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// An object (version) the upstream confirmed as deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedObject {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default)]
    pub delete_marker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_marker_version_id: Option<String>,
}

/// A per-item failure reported by a bulk delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteFailure {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub code: String,
    pub message: String,
}

/// Result of one bulk delete call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectsOutcome {
    pub deleted: Vec<DeletedObject>,
    pub errors: Vec<DeleteFailure>,
}
