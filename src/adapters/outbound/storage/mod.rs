//! Upstream store implementations
//!
//! `s3` talks to a real S3-compatible endpoint; `memory` is a complete
//! in-process stand-in used for local runs and tests.

pub mod memory;
pub mod s3;

pub use memory::{InMemoryStore, MemoryConnector, StoreOperation};
pub use s3::{AddressingStyle, RgwAdminClient, S3Config, S3Connector, S3Store};
