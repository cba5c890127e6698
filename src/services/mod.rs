pub mod aggregator;
pub mod hierarchy;
pub mod pagination;
pub mod prefix_deleter;
pub mod reconciler;

mod admin_service_impl;
mod bucket_service_impl;
mod object_service_impl;

pub use admin_service_impl::AdminServiceImpl;
pub use aggregator::AttributeAggregator;
pub use bucket_service_impl::BucketServiceImpl;
pub use hierarchy::HierarchyBuilder;
pub use object_service_impl::ObjectServiceImpl;
pub use pagination::PaginationWalker;
pub use prefix_deleter::{MAX_BATCH_SIZE, PrefixDeleter};
pub use reconciler::Reconciler;
