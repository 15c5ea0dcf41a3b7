//! CSV-backed storage for the submission portal.
//!
//! Two tables live inside the state repository:
//! - the **history**: one row per graded submission, append-only;
//! - the **registry**: the roster plus one status column per assignment.
//!
//! Both are read entirely and rewritten entirely on every mutation.

pub mod error;
pub mod models;
pub mod repositories;

pub use error::{StorageError, StorageResult};
