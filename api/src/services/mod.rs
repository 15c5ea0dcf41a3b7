//! Request-independent workflows behind the HTTP handlers.
//!
//! - [`submission`]: the upload pipeline (validate, assess, persist, push).
//! - [`closing`]: the post-deadline award transition.
//! - [`error`]: the error type every workflow returns and its HTTP mapping.

pub mod closing;
pub mod error;
pub mod submission;

pub use error::ServiceError;
