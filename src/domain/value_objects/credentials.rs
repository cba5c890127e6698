use crate::domain::errors::ValidationError;

/// Access key pair a request is signed with.
///
/// Supplied by the caller on every request; never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if !Self::is_valid_part(&access_key) || !Self::is_valid_part(&secret_key) {
            return Err(ValidationError::MalformedCredentials);
        }
        Ok(Self {
            access_key,
            secret_key,
        })
    }

    /// Parse the `<access key>:<secret key>` header form
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let (access_key, secret_key) = value
            .trim()
            .split_once(':')
            .ok_or(ValidationError::MalformedCredentials)?;
        Self::new(access_key, secret_key)
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    fn is_valid_part(part: &str) -> bool {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '/' | '='))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_value() {
        let creds = Credentials::parse("AKIAEXAMPLE:wJalr/XUtnFEMI+K7MDENG=").unwrap();
        assert_eq!(creds.access_key(), "AKIAEXAMPLE");
        assert_eq!(creds.secret_key(), "wJalr/XUtnFEMI+K7MDENG=");
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert!(Credentials::parse("no-separator").is_err());
        assert!(Credentials::parse(":secret").is_err());
        assert!(Credentials::parse("access:").is_err());
        assert!(Credentials::parse("acc ess:secret").is_err());
        assert!(Credentials::parse("access:sec:ret").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("access", "supersecret").unwrap();
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("access"));
        assert!(!rendered.contains("supersecret"));
    }
}
