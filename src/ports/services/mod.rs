mod admin_service;
mod bucket_service;
mod object_service;

pub use admin_service::AdminService;
pub use bucket_service::BucketService;
pub use object_service::ObjectService;
