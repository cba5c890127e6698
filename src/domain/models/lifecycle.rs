use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{errors::ValidationError, models::Tag};

/// Lifecycle configuration of a bucket; an empty rule list means none
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleConfiguration {
    #[serde(default)]
    pub rules: Vec<LifecycleRule>,
}

/// A single lifecycle rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRule {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: RuleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<LifecycleFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<LifecycleExpiration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noncurrent_version_expiration: Option<NoncurrentVersionExpiration>,
}

/// Status of a lifecycle rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuleStatus {
    Enabled,
    #[default]
    Disabled,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Enabled => "Enabled",
            RuleStatus::Disabled => "Disabled",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleExpiration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_object_delete_marker: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NoncurrentVersionExpiration {
    pub noncurrent_days: u32,
}

impl LifecycleConfiguration {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check rule ids are unique and within the upstream's 255 character limit
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for id in self.rules.iter().filter_map(|rule| rule.id.as_deref()) {
            if id.len() > 255 {
                return Err(ValidationError::InvalidField {
                    field: "ID".to_string(),
                    value: id.to_string(),
                    expected: "at most 255 characters".to_string(),
                });
            }
            if !seen.insert(id) {
                return Err(ValidationError::InvalidField {
                    field: "ID".to_string(),
                    value: id.to_string(),
                    expected: "a rule id unique within the configuration".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> LifecycleRule {
        LifecycleRule {
            id: Some(id.to_string()),
            status: RuleStatus::Enabled,
            prefix: None,
            filter: Some(LifecycleFilter {
                prefix: Some("logs/".to_string()),
                tag: None,
            }),
            expiration: Some(LifecycleExpiration {
                days: Some(30),
                ..Default::default()
            }),
            noncurrent_version_expiration: None,
        }
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let config = LifecycleConfiguration {
            rules: vec![rule("expire-logs"), rule("expire-logs")],
        };
        assert!(config.validate().is_err());

        let config = LifecycleConfiguration {
            rules: vec![rule("expire-logs"), rule("expire-tmp")],
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_shape() {
        let parsed: LifecycleConfiguration = serde_json::from_value(serde_json::json!({
            "Rules": [{
                "ID": "expire-logs",
                "Status": "Enabled",
                "Filter": {"Prefix": "logs/"},
                "Expiration": {"Days": 7}
            }]
        }))
        .unwrap();

        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.rules[0].id.as_deref(), Some("expire-logs"));
        assert_eq!(parsed.rules[0].status, RuleStatus::Enabled);
        assert_eq!(
            parsed.rules[0].expiration.as_ref().and_then(|e| e.days),
            Some(7)
        );
    }
}
