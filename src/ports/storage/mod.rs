mod admin_ops;
mod upstream_store;

pub use admin_ops::*;
pub use upstream_store::*;
