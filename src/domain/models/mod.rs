pub mod admin;
pub mod attributes;
pub mod deletion;
pub mod entry;
pub mod lifecycle;
pub mod listing;
pub mod object;

pub use admin::*;
pub use attributes::*;
pub use deletion::*;
pub use entry::*;
pub use lifecycle::*;
pub use listing::*;
pub use object::*;
