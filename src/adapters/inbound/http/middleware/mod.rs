mod credentials;

pub use credentials::{require_credentials, UpstreamSession, CREDENTIALS_HEADER};
