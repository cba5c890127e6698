use crate::domain::errors::ValidationError;

/// Separator used to derive a virtual folder hierarchy from flat keys
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiter(String);

impl Delimiter {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyDelimiter);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a key into its non-empty path segments.
    ///
    /// Leading, trailing and repeated delimiters never produce empty
    /// segments, so `"/a//b/"` and `"a/b"` split identically.
    pub fn split_key(&self, key: &str) -> Vec<String> {
        if key.is_empty() {
            return Vec::new();
        }
        key.split(self.0.as_str())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Join `prefix` segments and the segments of `key` into a normalized key
    pub fn build_key<S: AsRef<str>>(&self, key: &str, prefix: &[S]) -> String {
        let mut parts: Vec<String> = prefix
            .iter()
            .flat_map(|segment| self.split_key(segment.as_ref()))
            .collect();
        parts.extend(self.split_key(key));
        parts.join(&self.0)
    }

    /// Like [`Delimiter::build_key`] with the prefix given as one string
    pub fn prefixed_key(&self, key: &str, prefix: &str) -> String {
        self.build_key(key, &[prefix])
    }

    /// Join segments into a listing prefix, optionally terminated by the delimiter
    pub fn build_prefix<S: AsRef<str>>(&self, parts: &[S], trailing: bool) -> String {
        let mut prefix = self.build_key("", parts);
        if trailing && !prefix.is_empty() {
            prefix.push_str(&self.0);
        }
        prefix
    }

    /// Last non-empty segment of a key, used as the display name
    pub fn last_segment(&self, key: &str) -> Option<String> {
        self.split_key(key).pop()
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self("/".to_string())
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
