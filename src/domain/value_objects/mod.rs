mod bucket_name;
mod credentials;
mod delimiter;
mod object_key;
mod version_id;

pub use bucket_name::BucketName;
pub use credentials::Credentials;
pub use delimiter::Delimiter;
pub use object_key::ObjectKey;
pub use version_id::VersionId;
