mod mediator_errors;
mod upstream_errors;
mod validation_errors;

pub use mediator_errors::*;
pub use upstream_errors::*;
pub use validation_errors::*;
