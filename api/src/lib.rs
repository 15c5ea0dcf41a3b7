//! # Submission Portal API
//!
//! HTTP surface of the notebook submission portal. Routes live under `/api`
//! and hand the real work to [`services`], which drive the `marker`, `db`
//! and `util` crates.

pub mod response;
pub mod routes;
pub mod services;
pub mod state;
