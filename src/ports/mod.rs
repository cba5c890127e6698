pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{AdminService, BucketService, ObjectService};
pub use storage::{AdminOps, BucketStore, ListingStore, UpstreamConnector, UpstreamStore};
