use crate::domain::errors::ValidationError;

/// A validated object key in an upstream bucket.
///
/// Keys are opaque to the upstream: leading slashes, repeated delimiters and
/// trailing delimiters (folder markers) are all legal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > 1024 {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        if let Some(c) = value.chars().find(|c| c.is_control() && *c != '\t') {
            return Err(ValidationError::InvalidObjectKeyCharacter(c));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_keys() {
        assert!(ObjectKey::new("file.txt".to_string()).is_ok());
        assert!(ObjectKey::new("folder/".to_string()).is_ok());
        assert!(ObjectKey::new("/leading/slash".to_string()).is_ok());
        assert!(ObjectKey::new("a//b".to_string()).is_ok());
    }

    #[test]
    fn test_invalid_object_keys() {
        assert_eq!(
            ObjectKey::new(String::new()),
            Err(ValidationError::EmptyObjectKey)
        );
        assert!(ObjectKey::new("a".repeat(1025)).is_err());
        assert_eq!(
            ObjectKey::new("bad\0key".to_string()),
            Err(ValidationError::InvalidObjectKeyCharacter('\0'))
        );
    }
}
