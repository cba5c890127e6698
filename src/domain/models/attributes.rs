use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::errors::ValidationError;

/// Outcome of reading an optional upstream sub-resource.
///
/// Upstreams report an unset sub-resource (no tag set, no object-lock
/// configuration, no lifecycle) as an error code; adapters turn those codes
/// into `NotConfigured` so callers never branch on error strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubResource<T> {
    Configured(T),
    NotConfigured,
}

impl<T> SubResource<T> {
    pub fn configured(self) -> Option<T> {
        match self {
            SubResource::Configured(value) => Some(value),
            SubResource::NotConfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, SubResource::Configured(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SubResource<U> {
        match self {
            SubResource::Configured(value) => SubResource::Configured(f(value)),
            SubResource::NotConfigured => SubResource::NotConfigured,
        }
    }
}

impl<T: Default> SubResource<T> {
    pub fn unwrap_or_default(self) -> T {
        self.configured().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags attached to a bucket or object.
///
/// Two tag sets are equal when they contain the same tags, regardless of
/// order or duplicates.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self(tags)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn tags(&self) -> &[Tag] {
        &self.0
    }

    pub fn into_tags(self) -> Vec<Tag> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    fn as_set(&self) -> HashSet<&Tag> {
        self.0.iter().collect()
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.as_set() == other.as_set()
    }
}

impl From<Vec<Tag>> for TagSet {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RetentionMode {
    Governance,
    Compliance,
}

impl RetentionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionMode::Governance => "GOVERNANCE",
            RetentionMode::Compliance => "COMPLIANCE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GOVERNANCE" => Some(RetentionMode::Governance),
            "COMPLIANCE" => Some(RetentionMode::Compliance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionUnit {
    Days,
    Years,
}

/// Default retention rule of an object-lock configuration.
///
/// Exactly one of `days` or `years` is expected to be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRetention {
    pub mode: RetentionMode,
    pub days: Option<u32>,
    pub years: Option<u32>,
}

/// Object-lock configuration in the shape the upstream stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLockConfiguration {
    pub enabled: bool,
    pub default_retention: Option<DefaultRetention>,
}

/// Flattened object-lock view exchanged with the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectLockSettings {
    #[serde(default)]
    pub object_lock_enabled: Option<bool>,
    #[serde(default)]
    pub retention_enabled: Option<bool>,
    #[serde(default)]
    pub retention_mode: Option<RetentionMode>,
    #[serde(default)]
    pub retention_validity: Option<u32>,
    #[serde(default)]
    pub retention_unit: Option<RetentionUnit>,
}

impl ObjectLockSettings {
    /// Settings reported when object lock is off or a lock write was refused
    pub fn disabled() -> Self {
        Self {
            object_lock_enabled: Some(false),
            ..Default::default()
        }
    }

    /// Flatten an upstream configuration lookup
    pub fn from_lookup(lookup: SubResource<ObjectLockConfiguration>) -> Self {
        let config = match lookup {
            SubResource::Configured(config) => config,
            SubResource::NotConfigured => return Self::disabled(),
        };

        let retention = config.default_retention.as_ref();
        let years = retention.and_then(|r| r.years).filter(|y| *y > 0);
        let days = retention.and_then(|r| r.days).filter(|d| *d > 0);

        let retention_unit = if years.is_some() {
            Some(RetentionUnit::Years)
        } else if days.is_some() {
            Some(RetentionUnit::Days)
        } else {
            None
        };

        Self {
            object_lock_enabled: Some(config.enabled),
            retention_enabled: Some(retention_unit.is_some()),
            retention_mode: retention.map(|r| r.mode),
            retention_validity: years.or(days),
            retention_unit,
        }
    }

    /// Build the configuration to write upstream.
    ///
    /// A default retention rule is only produced when retention is enabled,
    /// in which case mode, validity and unit are all required.
    pub fn to_configuration(&self) -> Result<ObjectLockConfiguration, ValidationError> {
        self.validate()?;

        let default_retention = match (
            self.retention_enabled,
            self.retention_mode,
            self.retention_validity,
            self.retention_unit,
        ) {
            (Some(true), Some(mode), Some(validity), Some(unit)) => Some(DefaultRetention {
                mode,
                days: (unit == RetentionUnit::Days).then_some(validity),
                years: (unit == RetentionUnit::Years).then_some(validity),
            }),
            _ => None,
        };

        Ok(ObjectLockConfiguration {
            enabled: true,
            default_retention,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.retention_enabled != Some(true) {
            return Ok(());
        }

        let mut missing = Vec::new();
        if self.retention_mode.is_none() {
            missing.push("RetentionMode");
        }
        if self.retention_validity.unwrap_or(0) == 0 {
            missing.push("RetentionValidity");
        }
        if self.retention_unit.is_none() {
            missing.push("RetentionUnit");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::IncompleteRetention { missing })
        }
    }

    /// Lock flag, mode, validity and unit are all present
    pub fn has_complete_retention(&self) -> bool {
        self.object_lock_enabled.is_some()
            && self.retention_mode.is_some()
            && self.retention_validity.is_some()
            && self.retention_unit.is_some()
    }

    /// Any retention field differs from `other`
    pub fn retention_differs(&self, other: &ObjectLockSettings) -> bool {
        self.retention_enabled != other.retention_enabled
            || self.retention_mode != other.retention_mode
            || self.retention_validity != other.retention_validity
            || self.retention_unit != other.retention_unit
    }
}

/// Aggregate record of one bucket's independent upstream properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregateAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub versioning_enabled: Option<bool>,
    #[serde(default)]
    pub tag_set: TagSet,
    #[serde(flatten)]
    pub object_lock: ObjectLockSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retention(mode: RetentionMode, days: Option<u32>, years: Option<u32>) -> ObjectLockConfiguration {
        ObjectLockConfiguration {
            enabled: true,
            default_retention: Some(DefaultRetention { mode, days, years }),
        }
    }

    #[test]
    fn test_tag_set_equality_ignores_order() {
        let a = TagSet::new(vec![Tag::new("k1", "v1"), Tag::new("k2", "v2")]);
        let b = TagSet::new(vec![Tag::new("k2", "v2"), Tag::new("k1", "v1")]);
        let c = TagSet::new(vec![Tag::new("k1", "v1")]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(TagSet::empty(), TagSet::default());
    }

    #[test]
    fn test_not_configured_maps_to_disabled() {
        let settings = ObjectLockSettings::from_lookup(SubResource::NotConfigured);
        assert_eq!(settings.object_lock_enabled, Some(false));
        assert_eq!(settings.retention_enabled, None);
        assert_eq!(settings.retention_mode, None);
        assert_eq!(settings.retention_validity, None);
        assert_eq!(settings.retention_unit, None);
    }

    #[test]
    fn test_retention_unit_prefers_years() {
        let settings = ObjectLockSettings::from_lookup(SubResource::Configured(retention(
            RetentionMode::Compliance,
            None,
            Some(2),
        )));
        assert_eq!(settings.retention_unit, Some(RetentionUnit::Years));
        assert_eq!(settings.retention_validity, Some(2));
        assert_eq!(settings.retention_mode, Some(RetentionMode::Compliance));
        assert_eq!(settings.retention_enabled, Some(true));

        let settings = ObjectLockSettings::from_lookup(SubResource::Configured(retention(
            RetentionMode::Governance,
            Some(30),
            Some(0),
        )));
        assert_eq!(settings.retention_unit, Some(RetentionUnit::Days));
        assert_eq!(settings.retention_validity, Some(30));
    }

    #[test]
    fn test_enabled_without_rule() {
        let settings = ObjectLockSettings::from_lookup(SubResource::Configured(
            ObjectLockConfiguration {
                enabled: true,
                default_retention: None,
            },
        ));
        assert_eq!(settings.object_lock_enabled, Some(true));
        assert_eq!(settings.retention_enabled, Some(false));
        assert_eq!(settings.retention_unit, None);
        assert_eq!(settings.retention_validity, None);
    }

    #[test]
    fn test_zero_period_rule_is_not_retention() {
        for (days, years) in [(Some(0), Some(0)), (None, None), (Some(0), None)] {
            let settings = ObjectLockSettings::from_lookup(SubResource::Configured(retention(
                RetentionMode::Governance,
                days,
                years,
            )));
            assert_eq!(settings.object_lock_enabled, Some(true));
            assert_eq!(settings.retention_enabled, Some(false), "{:?}/{:?}", days, years);
            assert_eq!(settings.retention_unit, None);
            assert_eq!(settings.retention_validity, None);
        }
    }

    #[test]
    fn test_to_configuration_requires_complete_retention() {
        let incomplete = ObjectLockSettings {
            object_lock_enabled: Some(true),
            retention_enabled: Some(true),
            retention_mode: Some(RetentionMode::Governance),
            ..Default::default()
        };
        assert!(matches!(
            incomplete.to_configuration(),
            Err(ValidationError::IncompleteRetention { .. })
        ));

        let complete = ObjectLockSettings {
            object_lock_enabled: Some(true),
            retention_enabled: Some(true),
            retention_mode: Some(RetentionMode::Governance),
            retention_validity: Some(3),
            retention_unit: Some(RetentionUnit::Years),
        };
        let config = complete.to_configuration().unwrap();
        assert_eq!(
            config.default_retention,
            Some(DefaultRetention {
                mode: RetentionMode::Governance,
                days: None,
                years: Some(3),
            })
        );
    }

    #[test]
    fn test_aggregate_json_shape() {
        let attributes = AggregateAttributes {
            name: "photos".to_string(),
            creation_date: None,
            versioning_enabled: Some(true),
            tag_set: TagSet::new(vec![Tag::new("team", "ops")]),
            object_lock: ObjectLockSettings::disabled(),
        };

        let json = serde_json::to_value(&attributes).unwrap();
        assert_eq!(json["Name"], "photos");
        assert_eq!(json["VersioningEnabled"], true);
        assert_eq!(json["TagSet"][0]["Key"], "team");
        assert_eq!(json["ObjectLockEnabled"], false);

        let parsed: AggregateAttributes = serde_json::from_value(serde_json::json!({
            "Name": "photos",
            "TagSet": [],
            "ObjectLockEnabled": true,
            "RetentionEnabled": true,
            "RetentionMode": "COMPLIANCE",
            "RetentionValidity": 1,
            "RetentionUnit": "Years"
        }))
        .unwrap();
        assert_eq!(parsed.versioning_enabled, None);
        assert_eq!(
            parsed.object_lock.retention_mode,
            Some(RetentionMode::Compliance)
        );
    }
}
