use crate::domain::errors::ValidationError;

/// Identifier of one object version as assigned by the upstream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId(String);

impl VersionId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyVersionId);
        }

        if value.len() > 1024 {
            return Err(ValidationError::VersionIdTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        // Upstreams use UUIDs, base64-ish tokens or the literal "null"
        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.' | '+' | '/' | '=') {
                return Err(ValidationError::InvalidVersionIdCharacter(c));
            }
        }

        Ok(Self(value))
    }

    /// Version id the upstream reports for objects written while unversioned
    pub fn null() -> Self {
        Self("null".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_id_formats() {
        assert!(VersionId::new("3HL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY".to_string()).is_ok());
        assert!(VersionId::new("0b1c9a1e-7f6e-4a4e-9a7b-1a2b3c4d5e6f".to_string()).is_ok());
        assert_eq!(VersionId::null().as_str(), "null");
    }

    #[test]
    fn test_invalid_version_ids() {
        assert_eq!(
            VersionId::new(String::new()),
            Err(ValidationError::EmptyVersionId)
        );
        assert_eq!(
            VersionId::new("abc def".to_string()),
            Err(ValidationError::InvalidVersionIdCharacter(' '))
        );
    }
}
